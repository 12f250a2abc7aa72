use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_NAME, Notifier, launch_show, notification_body, parse_activation_argument};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        self.notify_with_action(task, "")
    }

    fn notify_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let task_id = task.id.clone().unwrap_or_default();
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(&notification_body(task))
            .text2(&task_id);

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }

        toast
            .on_activated(move |args| {
                let target = match args {
                    Some(args) if !action_value.is_empty() && args == action_value => {
                        Some(task_id.clone())
                    }
                    Some(args) if !args.trim().is_empty() => parse_activation_argument(&args),
                    _ => Some(task_id.clone()),
                };
                if let Some(id) = target.filter(|id| !id.is_empty()) {
                    let _ = launch_show(&id);
                }
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
