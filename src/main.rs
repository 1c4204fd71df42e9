#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use host_wizard::app::WizardApp;
use host_wizard::config::WizardConfig;
use tr::tr;
#[cfg(not(feature = "mo-locales"))]
use tr::tr_init;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Language part of the system locale, `en` when it cannot be determined.
fn system_language() -> String {
    sys_locale::get_locale()
        .and_then(|locale| {
            locale
                .split(['-', '_', '.'])
                .next()
                .map(|lang| lang.to_lowercase())
        })
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| "en".to_string())
}

#[cfg(feature = "mo-locales")]
fn load_translations(lang: &str) {
    let path = std::path::Path::new("locales")
        .join(lang)
        .join("LC_MESSAGES")
        .join("host_wizard.mo");
    match std::fs::read(&path) {
        Ok(bytes) => match tr::MoTranslator::from_vec_u8(bytes) {
            Ok(translator) => tr::set_translator!(translator),
            Err(e) => tracing::warn!(path = %path.display(), error = ?e, "invalid translation file"),
        },
        Err(_) => tracing::debug!(lang, "no translation file, using built-in strings"),
    }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let lang = system_language();

    #[cfg(not(feature = "mo-locales"))]
    tr_init!("./locales");

    #[cfg(feature = "mo-locales")]
    load_translations(&lang);

    let config = WizardConfig::load();
    info!(lang = %lang, "starting host wizard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(tr!("Host registration"))
            .with_inner_size([960.0, 640.0])
            .with_resizable(true),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "host_wizard",
        options,
        Box::new(|cc| Ok(Box::new(WizardApp::new(cc, config)))),
    )
}
