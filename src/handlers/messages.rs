use folio::{application::error::AppError, config::MessagesCmd};
use serde_json::json;

use super::Ctx;
use super::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: MessagesCmd) -> Result<(), AppError> {
    match cmd {
        MessagesCmd::List { unread } => {
            let messages = ctx.portfolio.messages.list().await?;
            if unread {
                let pending: Vec<_> = messages.iter().filter(|message| !message.read).collect();
                print_json(&pending)
            } else {
                print_json(messages.as_slice())
            }
        }
        MessagesCmd::Read { id } => {
            let message = ctx.portfolio.messages.mark_as_read(id).await?;
            print_json(&message)
        }
        MessagesCmd::Delete { id } => {
            ctx.portfolio.messages.delete(&id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}
