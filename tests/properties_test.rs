// 渲染不变量的性质测试（不涉及 I/O）
use better_image_tag::image_tag::picture_class;
use better_image_tag::{
    BreakpointFormats, ImageTagContext, RenderOptions, TRANSPARENT_GIF, TagConfig, TagError,
};
use once_cell::sync::Lazy;
use proptest::prelude::*;

static CTX: Lazy<ImageTagContext> =
    Lazy::new(|| ImageTagContext::with_dev_assets(TagConfig::default()).expect("context init failed"));

static STRICT_CTX: Lazy<ImageTagContext> = Lazy::new(|| {
    let config = TagConfig {
        require_alt_tags: true,
        ..TagConfig::default()
    };
    ImageTagContext::with_dev_assets(config).expect("context init failed")
});

#[derive(Debug, Clone, Copy)]
enum Step {
    Webp,
    Avif,
    Tablet,
    Desktop,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Webp),
        Just(Step::Avif),
        Just(Step::Tablet),
        Just(Step::Desktop),
    ]
}

fn image_name() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9_-]{0,12}", prop_oneof![Just("jpg"), Just("png"), Just("gif")])
        .prop_map(|(stem, ext)| format!("{}.{}", stem, ext))
}

proptest! {
    #[test]
    fn prop_picture_class_suffixes_all_but_lazyload(
        tokens in prop::collection::vec(
            prop_oneof![Just("lazyload".to_string()), "[a-z][a-z0-9-]{0,8}"],
            0..6,
        )
    ) {
        let derived = picture_class(&tokens.join(" "));
        let out: Vec<&str> = derived.split(' ').filter(|t| !t.is_empty()).collect();

        prop_assert_eq!(out.len(), tokens.len());
        for (original, token) in tokens.iter().zip(out) {
            if original == "lazyload" {
                prop_assert_eq!(token, "lazyload");
            } else {
                prop_assert_eq!(token.to_string(), format!("{}--picture", original));
            }
        }
    }

    #[test]
    fn prop_render_is_idempotent(
        name in image_name(),
        steps in prop::collection::vec(step(), 0..5),
        lazy in any::<bool>(),
    ) {
        let mut builder = CTX.image_builder(name, RenderOptions::new()).expect("builder init failed");
        for step in steps {
            match step {
                Step::Webp => { builder.webp().expect("webp failed"); }
                Step::Avif => { builder.avif().expect("avif failed"); }
                Step::Tablet => { builder.tablet_up("t.jpg", BreakpointFormats::new()).expect("tablet failed"); }
                Step::Desktop => { builder.desktop_up("d.jpg", BreakpointFormats::new()).expect("desktop failed"); }
            }
        }
        builder.lazy_load_when(lazy);

        prop_assert_eq!(builder.render(), builder.render());
    }

    #[test]
    fn prop_lazy_load_sets_placeholder_and_data_src(name in image_name()) {
        let mut builder = CTX.image_builder(name.clone(), RenderOptions::new()).expect("builder init failed");
        builder.lazy_load();

        let html = builder.render();
        let expected_src = format!(r#"src="{}""#, TRANSPARENT_GIF);
        let expected_data_src = format!(r#"data-src="/assets/{}""#, name);
        prop_assert!(html.contains(&expected_src));
        prop_assert!(html.contains(&expected_data_src));
    }

    #[test]
    fn prop_any_source_after_lazy_load_fails(
        name in image_name(),
        steps in prop::collection::vec(step(), 1..5),
    ) {
        let mut builder = CTX.image_builder(name, RenderOptions::new()).expect("builder init failed");
        builder.lazy_load();

        for step in steps {
            let result = match step {
                Step::Webp => builder.webp().map(|_| ()),
                Step::Avif => builder.avif().map(|_| ()),
                Step::Tablet => builder.tablet_up("t.jpg", BreakpointFormats::new()).map(|_| ()),
                Step::Desktop => builder.desktop_up("d.jpg", BreakpointFormats::new()).map(|_| ()),
            };
            prop_assert!(matches!(result, Err(TagError::EarlyLazyLoad(_))));
        }
    }

    #[test]
    fn prop_format_order_follows_registration(name in image_name(), avif_first in any::<bool>()) {
        let mut builder = CTX.image_builder(name, RenderOptions::new()).expect("builder init failed");
        if avif_first {
            builder.avif().expect("avif failed").webp().expect("webp failed");
        } else {
            builder.webp().expect("webp failed").avif().expect("avif failed");
        }

        let html = builder.render();
        let avif = html.find("image/avif").expect("avif missing");
        let webp = html.find("image/webp").expect("webp missing");
        prop_assert_eq!(avif < webp, avif_first);
    }

    #[test]
    fn prop_non_blank_alt_satisfies_requirement(alt in "[A-Za-z0-9][A-Za-z0-9 ]{0,20}") {
        prop_assert!(STRICT_CTX.image_builder("a.png", RenderOptions::new().with("alt", alt)).is_ok());
        prop_assert!(matches!(
            STRICT_CTX.image_builder("a.png", RenderOptions::new()),
            Err(TagError::MissingAltTag(_))
        ));
    }
}
