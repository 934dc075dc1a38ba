//! Subcommand handlers. Every handler prints its result as JSON on stdout.

mod contact;
mod io;
mod messages;
mod posts;
mod print;
mod projects;
mod settings;
mod text;
mod upload;

use std::sync::Arc;

use folio::{
    application::{
        assets::AssetUploader, dashboard::DashboardStats, error::AppError, portfolio::Portfolio,
    },
    config::{Command, ContactSettings, Settings},
    infra::{backend::BackendClient, rest::RestGateway, storage::RestObjectStorage},
};

use self::print::print_json;

/// Stores and settings shared by the handlers that talk to the backend.
pub struct Ctx {
    pub portfolio: Portfolio,
    pub contact: ContactSettings,
}

impl Ctx {
    fn connect(settings: &Settings) -> Result<Self, AppError> {
        let (url, anon_key) = settings.backend.endpoint()?;
        let backend = BackendClient::new(
            url.as_str(),
            anon_key,
            settings.backend.access_token.clone(),
        )?;

        let gateway = Arc::new(RestGateway::new(backend.clone()));
        let storage = Arc::new(RestObjectStorage::new(backend));
        let assets = AssetUploader::new(storage, settings.storage.bucket.clone());

        Ok(Self {
            portfolio: Portfolio::new(gateway, Some(assets)),
            contact: settings.contact.clone(),
        })
    }
}

pub async fn dispatch(command: Command, settings: &Settings) -> Result<(), AppError> {
    match command {
        Command::Slug { text } => text::slug(&text),
        Command::ReadingTime { file } => text::reading_time(&file).await,
        Command::Projects(args) => projects::handle(&Ctx::connect(settings)?, args.action).await,
        Command::Posts(args) => posts::handle(&Ctx::connect(settings)?, args.action).await,
        Command::Messages(args) => messages::handle(&Ctx::connect(settings)?, args.action).await,
        Command::Settings(args) => settings::handle(&Ctx::connect(settings)?, args.action).await,
        Command::Contact(args) => contact::handle(&Ctx::connect(settings)?, args).await,
        Command::Upload(args) => upload::handle(&Ctx::connect(settings)?, args).await,
        Command::Stats => {
            let ctx = Ctx::connect(settings)?;
            let stats = DashboardStats::load(&ctx.portfolio).await?;
            print_json(&stats)
        }
    }
}
