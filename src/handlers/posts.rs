use folio::{
    application::error::AppError,
    config::{PostFieldArgs, PostsCmd},
    domain::{
        entities::PostRecord,
        posts::{PostDraft, PostPatch},
        reading_time::reading_time_minutes,
    },
};
use serde::Serialize;
use serde_json::json;

use super::Ctx;
use super::io::read_opt_value;
use super::print::print_json;

/// A post as shown on its page, with the reading-time estimate.
#[derive(Serialize)]
struct PostView<'a> {
    #[serde(flatten)]
    post: &'a PostRecord,
    reading_time_minutes: usize,
}

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), AppError> {
    match cmd {
        PostsCmd::List { published, search } => list(ctx, published, search).await,
        PostsCmd::Show { slug } => show(ctx, &slug).await,
        PostsCmd::Create(fields) => create(ctx, *fields).await,
        PostsCmd::Update { id, fields } => update(ctx, id, *fields).await,
        PostsCmd::Delete { id } => delete(ctx, id).await,
    }
}

async fn list(ctx: &Ctx, published: bool, search: Option<String>) -> Result<(), AppError> {
    if published || search.is_some() {
        let posts = ctx
            .portfolio
            .posts
            .published(search.as_deref().unwrap_or_default())
            .await?;
        return print_json(&posts);
    }

    let posts = ctx.portfolio.posts.list().await?;
    print_json(posts.as_slice())
}

async fn show(ctx: &Ctx, slug: &str) -> Result<(), AppError> {
    let post = ctx.portfolio.posts.get_by_slug(slug).await?;
    print_json(&PostView {
        reading_time_minutes: reading_time_minutes(&post.content),
        post: &post,
    })
}

async fn create(ctx: &Ctx, fields: PostFieldArgs) -> Result<(), AppError> {
    let PostFieldArgs {
        title,
        content,
        content_file,
        slug,
        published,
        excerpt,
        image_url,
        category,
        category_color,
        tags,
    } = fields;

    let draft = PostDraft {
        title: title.unwrap_or_default(),
        content: read_opt_value(content, content_file)
            .await?
            .unwrap_or_default(),
        slug: slug.unwrap_or_default(),
        published: published.unwrap_or(false),
        excerpt,
        image_url,
        category,
        category_color,
        tags: tags.unwrap_or_default(),
    };
    let created = ctx.portfolio.posts.create(draft).await?;
    print_json(&created)
}

async fn update(ctx: &Ctx, id: i64, fields: PostFieldArgs) -> Result<(), AppError> {
    let PostFieldArgs {
        title,
        content,
        content_file,
        slug,
        published,
        excerpt,
        image_url,
        category,
        category_color,
        tags,
    } = fields;

    let patch = PostPatch {
        title,
        content: read_opt_value(content, content_file).await?,
        slug,
        published,
        excerpt,
        image_url,
        category,
        category_color,
        tags,
    };
    let updated = ctx.portfolio.posts.update(&id, patch).await?;
    print_json(&updated)
}

async fn delete(ctx: &Ctx, id: i64) -> Result<(), AppError> {
    ctx.portfolio.posts.delete(&id).await?;
    print_json(&json!({ "deleted": id }))
}
