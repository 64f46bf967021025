//! # 图片标签预览：命令行入口
//!
//! 本文件只负责日志初始化与参数解析，按参数链式调用构建器后打印 HTML。
//! 渲染逻辑全部在库中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;

use better_image_tag::{
    BreakpointFormats, ImageTagContext, ImageTagFacade, RenderOptions, TagConfig, TagError, TagGate,
};
use clap::{Arg, ArgAction, ArgMatches, Command};

fn cli() -> Command {
    Command::new("image-tag-preview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render one enhanced <img>/<picture> tag and print it")
        .arg(Arg::new("image").required(true).help("Image reference: asset name or URL"))
        .arg(Arg::new("alt").long("alt").help("Alt text"))
        .arg(Arg::new("class").long("class").help("CSS class(es)"))
        .arg(
            Arg::new("options")
                .long("options")
                .help("Extra options as a JSON object, e.g. '{\"data\": {\"id\": \"1\"}}'"),
        )
        .arg(Arg::new("config").long("config").help("Path to a JSON config file"))
        .arg(Arg::new("manifest").long("manifest").help("Path to a compiled asset manifest"))
        .arg(Arg::new("size").long("size").action(ArgAction::SetTrue).help("Probe width/height"))
        .arg(Arg::new("avif").long("avif").action(ArgAction::SetTrue).help("Add an AVIF source"))
        .arg(Arg::new("webp").long("webp").action(ArgAction::SetTrue).help("Add a WebP source"))
        .arg(Arg::new("tablet").long("tablet").help("Tablet-and-up source URL"))
        .arg(Arg::new("desktop").long("desktop").help("Desktop-and-up source URL"))
        .arg(Arg::new("inline").long("inline").action(ArgAction::SetTrue).help("Inline as data URI / raw SVG"))
        .arg(Arg::new("lazy").long("lazy").action(ArgAction::SetTrue).help("Lazy-load the image"))
        .arg(Arg::new("picture").long("picture").action(ArgAction::SetTrue).help("Force <picture> markup"))
        .arg(Arg::new("disabled").long("disabled").action(ArgAction::SetTrue).help("Render the plain tag only"))
}

fn load_config(matches: &ArgMatches) -> Result<TagConfig, TagError> {
    match matches.get_one::<String>("config") {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| TagError::Config(format!("无法读取配置文件 {}：{}", path, e)))?;
            TagConfig::from_json_str(&raw)
        }
        None => Ok(TagConfig::default()),
    }
}

fn render_options(matches: &ArgMatches) -> Result<RenderOptions, TagError> {
    let mut options = match matches.get_one::<String>("options") {
        Some(json) => RenderOptions::from_json_str(json)?,
        None => RenderOptions::new(),
    };
    if let Some(alt) = matches.get_one::<String>("alt") {
        options.insert("alt", alt.as_str());
    }
    if let Some(class) = matches.get_one::<String>("class") {
        options.insert("class", class.as_str());
    }
    Ok(options)
}

async fn run(matches: &ArgMatches) -> Result<String, TagError> {
    let config = load_config(matches)?;
    let ctx = match matches.get_one::<String>("manifest") {
        Some(manifest) => ImageTagContext::with_manifest(config, manifest)?,
        None => ImageTagContext::with_dev_assets(config)?,
    };
    let gate = TagGate {
        disabled: matches.get_flag("disabled"),
        ..TagGate::default()
    };
    let facade = ImageTagFacade::new(ctx, gate);

    let image = matches
        .get_one::<String>("image")
        .ok_or_else(|| TagError::Config("缺少图片参数".to_string()))?;
    let options = render_options(matches)?;

    if matches.get_flag("picture") {
        return facade.picture_tag(image.as_str(), options);
    }

    let mut tag = facade.image_tag(image.as_str(), options)?;
    if matches.get_flag("size") {
        tag.with_size().await;
    }
    if matches.get_flag("avif") {
        tag.avif()?;
    }
    if matches.get_flag("webp") {
        tag.webp()?;
    }
    if let Some(url) = matches.get_one::<String>("tablet") {
        tag.tablet_up(url.as_str(), BreakpointFormats::new())?;
    }
    if let Some(url) = matches.get_one::<String>("desktop") {
        tag.desktop_up(url.as_str(), BreakpointFormats::new())?;
    }
    if matches.get_flag("inline") {
        tag.inline().await?;
    }
    tag.lazy_load_when(matches.get_flag("lazy"));

    Ok(tag.render())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match run(&matches).await {
        Ok(html) => {
            println!("{}", html);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("❌ 渲染失败：{}", err);
            ExitCode::FAILURE
        }
    }
}
