use folio::{
    application::error::AppError,
    config::{AssetKindArg, UploadArgs},
};
use serde_json::json;

use super::Ctx;
use super::io::read_bytes;
use super::print::print_json;

pub async fn handle(ctx: &Ctx, args: UploadArgs) -> Result<(), AppError> {
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::validation("upload path has no file name"))?;
    let bytes = read_bytes(&args.file).await?;

    let url = match args.kind {
        AssetKindArg::Projects => {
            ctx.portfolio
                .projects
                .upload_asset(&file_name, bytes)
                .await?
        }
        AssetKindArg::Posts => ctx.portfolio.posts.upload_asset(&file_name, bytes).await?,
    };
    print_json(&json!({ "url": url.as_str() }))
}
