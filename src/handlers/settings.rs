use folio::{
    application::error::AppError,
    config::{SettingsCmd, SettingsFieldArgs},
    domain::{entities::SocialLinks, settings::SettingsPatch},
};

use super::Ctx;
use super::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: SettingsCmd) -> Result<(), AppError> {
    match cmd {
        SettingsCmd::Show => show(ctx).await,
        SettingsCmd::Set(fields) => set(ctx, fields).await,
    }
}

async fn show(ctx: &Ctx) -> Result<(), AppError> {
    let current = ctx.portfolio.settings.current().await?;
    print_json(&current)
}

async fn set(ctx: &Ctx, fields: SettingsFieldArgs) -> Result<(), AppError> {
    let SettingsFieldArgs {
        site_title,
        site_description,
        contact_email,
        github,
        linkedin,
        discord,
    } = fields;

    // Links are stored as one document; keep the ones not given on the
    // command line.
    let social_links = if github.is_some() || linkedin.is_some() || discord.is_some() {
        let saved = ctx
            .portfolio
            .settings
            .current()
            .await?
            .map(|settings| settings.social_links)
            .unwrap_or_default();
        Some(SocialLinks {
            github: github.or(saved.github),
            linkedin: linkedin.or(saved.linkedin),
            discord: discord.or(saved.discord),
        })
    } else {
        None
    };

    let patch = SettingsPatch {
        site_title,
        site_description,
        contact_email,
        social_links,
    };
    let saved = ctx.portfolio.settings.upsert(patch).await?;
    print_json(&saved)
}
