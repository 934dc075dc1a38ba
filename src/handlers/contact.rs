use std::sync::Arc;

use folio::{
    application::{
        contact::{ContactSubmission, SubmitOutcome},
        error::AppError,
    },
    config::ContactArgs,
    infra::ledger::FileLedger,
};
use serde_json::json;

use super::Ctx;
use super::print::print_json;

pub async fn handle(ctx: &Ctx, args: ContactArgs) -> Result<(), AppError> {
    let ContactArgs {
        name,
        email,
        message,
        honeypot,
    } = args;

    let ledger = Arc::new(FileLedger::new(ctx.contact.ledger_path.clone()));
    let service = ctx.portfolio.contact(ledger, ctx.contact.rate_limit);
    let outcome = service
        .submit(ContactSubmission {
            name,
            email,
            message,
            honeypot,
        })
        .await?;

    match outcome {
        SubmitOutcome::Sent(record) => print_json(&record),
        SubmitOutcome::Ignored => print_json(&json!({ "status": "ignored" })),
    }
}
