use folio::{
    application::error::AppError,
    config::{ProjectFieldArgs, ProjectsCmd},
    domain::{
        projects::{ProjectDraft, ProjectPatch},
        types::ProjectStatus,
    },
};
use serde_json::json;

use super::Ctx;
use super::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: ProjectsCmd) -> Result<(), AppError> {
    match cmd {
        ProjectsCmd::List => list(ctx).await,
        ProjectsCmd::Create(fields) => create(ctx, *fields).await,
        ProjectsCmd::Update { id, fields } => update(ctx, id, *fields).await,
        ProjectsCmd::Delete { id } => delete(ctx, id).await,
    }
}

async fn list(ctx: &Ctx) -> Result<(), AppError> {
    let projects = ctx.portfolio.projects.list().await?;
    print_json(projects.as_slice())
}

async fn create(ctx: &Ctx, fields: ProjectFieldArgs) -> Result<(), AppError> {
    let defaults = ProjectDraft::default();
    let ProjectFieldArgs {
        name,
        tagline,
        description,
        image,
        tags,
        github_url,
        demo_url,
        language,
        language_color,
        stars,
        forks,
        views,
        logo,
        gradient,
        status,
        is_ai,
    } = fields;

    let draft = ProjectDraft {
        name: name.unwrap_or_default(),
        tagline,
        description,
        image,
        tags: tags.unwrap_or_default(),
        github_url,
        demo_url,
        language,
        language_color,
        stars: stars.unwrap_or(defaults.stars),
        forks: forks.unwrap_or(defaults.forks),
        views,
        logo,
        gradient,
        status: status.map(ProjectStatus::from).or(defaults.status),
        is_ai: is_ai.unwrap_or(defaults.is_ai),
    };
    let created = ctx.portfolio.projects.create(draft).await?;
    print_json(&created)
}

async fn update(ctx: &Ctx, id: String, fields: ProjectFieldArgs) -> Result<(), AppError> {
    let ProjectFieldArgs {
        name,
        tagline,
        description,
        image,
        tags,
        github_url,
        demo_url,
        language,
        language_color,
        stars,
        forks,
        views,
        logo,
        gradient,
        status,
        is_ai,
    } = fields;

    let patch = ProjectPatch {
        name,
        tagline,
        description,
        image,
        tags,
        github_url,
        demo_url,
        language,
        language_color,
        stars,
        forks,
        views,
        logo,
        gradient,
        status: status.map(ProjectStatus::from),
        is_ai,
    };
    let updated = ctx.portfolio.projects.update(&id, patch).await?;
    print_json(&updated)
}

async fn delete(ctx: &Ctx, id: String) -> Result<(), AppError> {
    ctx.portfolio.projects.delete(&id).await?;
    print_json(&json!({ "deleted": id }))
}
