use std::{sync::Arc, time::Instant};

use admute::{
    PageContext, PageDriver,
    bridge::{BackgroundService, ChannelBridge, MemoryTabAudio},
    common::types::AnyResult,
    configs::Config,
    dom::{Dom, MemoryDom},
    domains::{AdDomains, HttpHostListSource, JsonFileStore, RefreshOutcome},
    log_println,
    mute::{MuteCoordinator, TabMuter},
};
use tracing::{info, warn};

const USAGE: &str = "usage: admute [check] <host-or-url>...\n       admute simulate <media-url>...";

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    admute::common::logger::init(&config);

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let simulate = match args.first().map(String::as_str) {
        Some("simulate") => {
            args.remove(0);
            true
        }
        Some("check") => {
            args.remove(0);
            false
        }
        _ => false,
    };

    if args.is_empty() {
        log_println!("{}", USAGE);
        return Ok(());
    }

    let domains = Arc::new(AdDomains::new(&config.domains.extra));
    let outcome = refresh_domains(&config, &domains).await;
    info!("Ad domain list: {:?}", outcome);

    if simulate {
        for url in &args {
            simulate_page(&config, domains.clone(), url).await;
        }
    } else {
        for arg in &args {
            let verdict = match host_of(arg) {
                Some(host) if domains.is_ad_domain(&host) => "ad",
                Some(_) => "clean",
                None => "invalid",
            };
            log_println!("{}\t{}", arg, verdict);
        }
    }

    Ok(())
}

async fn refresh_domains(config: &Config, domains: &AdDomains) -> RefreshOutcome {
    let store = JsonFileStore::new(&config.domains.cache_path);
    match HttpHostListSource::new(config.domains.fetch_timeout_secs) {
        Ok(source) => domains.refresh(&config.domains, &store, &source).await,
        Err(e) => {
            warn!("Cannot build HTTP client: {}; using built-in list", e);
            RefreshOutcome::BuiltinOnly
        }
    }
}

fn host_of(arg: &str) -> Option<String> {
    if arg.contains("://") {
        url::Url::parse(arg)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
    } else {
        let host = arg.trim().trim_end_matches('.').to_ascii_lowercase();
        (!host.is_empty()).then_some(host)
    }
}

/// Plays `url` in a one-video page and reports what the coordinator did.
async fn simulate_page(config: &Config, domains: Arc<AdDomains>, url: &str) {
    let dom = Arc::new(MemoryDom::new(Some("https://content.example/")));
    let video = dom.append_new(dom.body(), "video");

    let (bridge, requests) = ChannelBridge::new();
    let background = tokio::spawn(
        BackgroundService::new(MemoryTabAudio::new())
            .with_page_url("https://content.example/")
            .run(requests),
    );

    let ctx = PageContext::new(domains, TabMuter::new(Arc::new(bridge)), config);
    let mut driver = PageDriver::new(MuteCoordinator::new(dom.clone(), None), ctx);

    let report = driver.start(Instant::now()).await;
    dom.set_src(video, url);
    dom.set_paused(video, false);
    for event in admute::driver::MediaEvent::ALL {
        if event != admute::driver::MediaEvent::Ended {
            driver.on_media_event(video, event).await;
        }
    }

    let reason = driver
        .context()
        .records
        .reason(video.into())
        .map_or("-", |reason| reason.as_str());
    log_println!(
        "{}\tmuted={}\treason={}\tregistered={}",
        url,
        dom.is_muted(video),
        reason,
        report.newly_registered.len()
    );

    drop(driver);
    if let Err(e) = background.await {
        warn!("Background task failed: {}", e);
    }
}
