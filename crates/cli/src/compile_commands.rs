use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Args,
    serde_json::{Value, json},
    tessera_common::ChatType,
    tessera_config::TesseraConfig,
    tessera_media::{files, mime},
    tessera_segments::{Params, Segment, SegmentCompiler},
};

/// Conversation the segments are addressed to.
#[derive(Args)]
pub struct Target {
    /// Raw chat type: 1 direct, 2 group.
    #[arg(long, default_value_t = ChatType::GROUP_RAW)]
    chat_type: i32,
    /// Peer (group or account) id.
    #[arg(long)]
    peer: String,
    /// Id of the message being built.
    #[arg(long, default_value_t = 0)]
    msg_id: i64,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Segment type, e.g. `text`, `image`, `record`.
    #[arg(value_name = "TYPE")]
    segment_type: String,
    #[command(flatten)]
    target: Target,
    /// Segment data as a JSON object.
    #[arg(long, default_value = "{}")]
    data: String,
}

#[derive(Args)]
pub struct BatchArgs {
    /// JSON file holding an array of `{"type": ..., "data": {...}}` segments.
    file: PathBuf,
    #[command(flatten)]
    target: Target,
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn handle_compile(config: &TesseraConfig, args: CompileArgs) -> Result<()> {
    let data: Value = serde_json::from_str(&args.data).context("--data is not valid JSON")?;
    anyhow::ensure!(data.is_object(), "--data must be a JSON object");

    let compiler = SegmentCompiler::from_config(config)?;
    let outcome = compiler
        .compile(
            &args.segment_type,
            ChatType::from_raw(args.target.chat_type),
            args.target.msg_id,
            &args.target.peer,
            Params::from_value(data),
        )
        .await?;
    print_json(&outcome)
}

pub async fn handle_batch(config: &TesseraConfig, args: BatchArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let segments: Vec<Segment> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a segment array", args.file.display()))?;

    let compiler = SegmentCompiler::from_config(config)?;
    let elements = compiler
        .compile_all(
            ChatType::from_raw(args.target.chat_type),
            args.target.msg_id,
            &args.target.peer,
            &segments,
        )
        .await?;
    print_json(&elements)
}

pub async fn handle_classify(path: &Path) -> Result<()> {
    let kind = tessera_voice::classify(path).await?;
    let format = mime::sniff_file(path).await?;
    let md5 = files::file_md5(path).await?;
    let size = files::file_len(path).await.unwrap_or(0);

    print_json(&json!({
        "path": path.display().to_string(),
        "kind": kind,
        "format": format.map(|f| f.extension()),
        "mime": format.map(|f| f.mime_type()),
        "md5": md5,
        "size": size,
    }))
}
