use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytscout_core::ChannelRecord;

use super::*;

const TRACKED_HTML: &str = r#"<html><body>
    <p class="card-value-views">1.5M</p>
    <p class="card-value">+2K</p>
    <p class="card-rev">$400 - $1.2K</p>
</body></html>"#;

const NO_DELAY: EnrichSettings = EnrichSettings {
    delay_min_ms: 0,
    delay_max_ms: 0,
    save_every: 1,
};

fn row(username: &str, url: &str, profile: &str) -> ChannelRecord {
    ChannelRecord {
        username: username.to_owned(),
        channel_url: url.to_owned(),
        search_niche: "cooking".to_owned(),
        viewstats_profile_url: profile.to_owned(),
        ..ChannelRecord::default()
    }
}

fn seeded_table(dir: &TempDir) -> ChannelTable {
    let mut table =
        ChannelTable::load_or_create(dir.path().join("channels.csv")).expect("create table");
    table.insert(row("@chef", "https://www.youtube.com/@chef", ""));
    table.insert(row("Unknown", "https://www.youtube.com/channel/UC9", "N/A"));
    table.insert(row(
        "@done",
        "https://www.youtube.com/@done",
        "https://www.viewstats.com/@done/channelytics",
    ));
    table.save().expect("seed save");
    table
}

fn client(server: &MockServer) -> ViewStatsClient {
    ViewStatsClient::new(&server.uri(), 5)
        .expect("client construction should not fail")
        .with_retry_policy(0, 0)
}

#[tokio::test]
async fn enriches_pending_rows_and_persists_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@chef/channelytics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRACKED_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let mut table = seeded_table(&dir);
    let pending = table.pending_enrichment();
    assert_eq!(pending, vec![0, 1]);

    let stats = enrich_rows(
        &client(&server),
        &mut table,
        &pending,
        NO_DELAY,
        std::future::pending(),
    )
    .await
    .expect("enrichment should run");

    assert_eq!(
        stats,
        EnrichStats {
            processed: 2,
            successful: 1,
            failed: 1,
            interrupted: false,
        }
    );

    let reloaded = ChannelTable::load(dir.path().join("channels.csv")).expect("reload");
    let rows = reloaded.rows();
    assert_eq!(
        rows[0].viewstats_profile_url,
        format!("{}/@chef/channelytics", server.uri())
    );
    assert_eq!(rows[0].views_last_28_days, "1.5M");
    assert_eq!(rows[0].subs_last_28_days, "+2K");
    assert_eq!(rows[0].estimated_rev_last_28_days, "$400 - $1.2K");
    assert_eq!(rows[1].viewstats_profile_url, "no username available");
    assert!(rows[1].views_last_28_days.is_empty());
    assert_eq!(
        rows[2].viewstats_profile_url,
        "https://www.viewstats.com/@done/channelytics"
    );
    assert!(reloaded.pending_enrichment().is_empty());
}

#[tokio::test]
async fn shutdown_before_first_row_still_saves() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRACKED_HTML))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let mut table = seeded_table(&dir);
    std::fs::remove_file(dir.path().join("channels.csv")).expect("remove seed file");
    let pending = table.pending_enrichment();

    let stats = enrich_rows(
        &client(&server),
        &mut table,
        &pending,
        NO_DELAY,
        std::future::ready(()),
    )
    .await
    .expect("interrupted run still succeeds");

    assert!(stats.interrupted);
    assert_eq!(stats.processed, 0);
    let reloaded = ChannelTable::load(dir.path().join("channels.csv")).expect("final save");
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.pending_enrichment(), vec![0, 1]);
}

#[tokio::test]
async fn checkpoint_reaches_disk_before_the_run_ends() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@slow/channelytics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TRACKED_HTML)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRACKED_HTML))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let csv_path = dir.path().join("channels.csv");
    let mut table = ChannelTable::load_or_create(&csv_path).expect("create table");
    table.insert(row("@one", "https://www.youtube.com/@one", ""));
    table.insert(row("@two", "https://www.youtube.com/@two", ""));
    table.insert(row("@slow", "https://www.youtube.com/@slow", ""));
    table.save().expect("seed save");
    let pending = table.pending_enrichment();

    // Resolves only once the first two rows are enriched in the file itself.
    let watch_path = csv_path.clone();
    let checkpoint_seen = async move {
        loop {
            if let Ok(on_disk) = ChannelTable::load(&watch_path) {
                if on_disk.pending_enrichment() == vec![2] {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    let settings = EnrichSettings {
        save_every: 2,
        ..NO_DELAY
    };
    let stats = enrich_rows(&client(&server), &mut table, &pending, settings, checkpoint_seen)
        .await
        .expect("enrichment should run");

    assert!(stats.interrupted, "checkpoint after row 2 never reached disk");
    assert_eq!(stats.processed, 2);
    let reloaded = ChannelTable::load(&csv_path).expect("reload");
    assert_eq!(reloaded.rows()[0].views_last_28_days, "1.5M");
    assert_eq!(reloaded.rows()[1].views_last_28_days, "1.5M");
    assert!(reloaded.rows()[2].needs_enrichment());
}

#[tokio::test]
async fn final_save_covers_rows_short_of_a_checkpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRACKED_HTML))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let csv_path = dir.path().join("channels.csv");
    let mut table = ChannelTable::load_or_create(&csv_path).expect("create table");
    table.insert(row("@one", "https://www.youtube.com/@one", ""));
    table.insert(row("@two", "https://www.youtube.com/@two", ""));
    table.save().expect("seed save");

    // Stop after the first row; with save_every = 5 only the final save writes it.
    let settings = EnrichSettings {
        save_every: 5,
        ..NO_DELAY
    };
    let stats = enrich_rows(&client(&server), &mut table, &[0], settings, std::future::pending())
        .await
        .expect("enrichment should run");

    assert_eq!(stats.processed, 1);
    let reloaded = ChannelTable::load(&csv_path).expect("reload");
    assert!(!reloaded.rows()[0].needs_enrichment());
    assert!(reloaded.rows()[1].needs_enrichment());
}

#[test]
fn delay_stays_within_configured_bounds() {
    let settings = EnrichSettings {
        delay_min_ms: 10,
        delay_max_ms: 20,
        save_every: 5,
    };
    for _ in 0..50 {
        let delay = settings.next_delay();
        assert!(delay >= Duration::from_millis(10) && delay <= Duration::from_millis(20));
    }
}
