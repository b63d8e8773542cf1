//! End-to-end CLI tests against a mock site configured through `--config`.

#![allow(deprecated)] // cargo_bin is deprecated in newer assert_cmd

use std::path::PathBuf;

use assert_cmd::Command;
use httpmock::prelude::*;

fn anisrc() -> Command {
    Command::cargo_bin("anisrc").expect("binary 'anisrc' should be built")
}

/// Write a config pointing both sources at `server`.
fn config_for(server: &MockServer, name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("anisrc-{}-{name}.toml", std::process::id()));
    let base = server.base_url();
    let toml = format!(
        "[otakudesu]\nbase_url = \"{base}\"\nretry_limit = 0\n\n\
         [samehadaku]\nbase_url = \"{base}\"\nretry_limit = 0\n"
    );
    std::fs::write(&path, toml).expect("config should be writable");
    path
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("binary should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn schedule_prints_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/jadwal-rilis/");
        then.status(200).body(
            r#"<div id="rabu"><div class="items"><div class="item">
                 <a class="name" href="/anime/kaiju-8/">Kaiju No. 8</a><span class="time">22:00</span>
               </div></div></div>"#,
        );
    });

    let config = config_for(&server, "schedule");
    let json = stdout_json(anisrc().arg("--config").arg(&config).args(["samehadaku", "schedule"]));

    assert_eq!(json[0]["day"], "RABU");
    assert_eq!(json[0]["list"][0]["title"], "Kaiju No. 8");
    assert_eq!(json[0]["list"][0]["time"], "22:00");
    let _ = std::fs::remove_file(config);
}

#[test]
fn home_merges_latest_and_top_ten() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/anime-terbaru/");
        then.status(200).body(
            r#"<div class="post-show"><ul><li><h2 class="entry-title"><a href="/x-episode-3/">X</a></h2></li></ul></div>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(
            r#"<div class="topten-animesu"><ul><li><a class="series" href="/anime/y/"><span class="judul">Y</span></a></li></ul></div>"#,
        );
    });

    let config = config_for(&server, "home");
    let json = stdout_json(anisrc().arg("--config").arg(&config).arg("home"));

    assert_eq!(json["latest"][0]["title"], "X");
    assert_eq!(json["topTen"][0]["title"], "Y");
    assert_eq!(json["topTen"][0]["rating"], "?");
    let _ = std::fs::remove_file(config);
}

#[test]
fn detail_merges_otakudesu_episodes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/anime/frieren-sub-indo/");
        then.status(200).body(
            r#"<div class="infozin"><div class="infozingle"><p><span><b>Judul</b>: Frieren</span></p></div></div>
               <div class="episodelist"><ul><li><a href="/episode/frieren-episode-1/">Frieren Episode 1 Subtitle Indonesia</a></li></ul></div>"#,
        );
    });

    // Both sources share the mock origin; the first configured one wins
    let config = config_for(&server, "detail");
    let url = server.url("/anime/frieren-sub-indo/");
    let json = stdout_json(anisrc().arg("--config").arg(&config).args(["detail", &url]));

    assert_eq!(json["title"], "Frieren");
    assert_eq!(json["episodes"][0]["title"], "Episode 1");
    assert_eq!(json["synopsis"], "Sinopsis tidak tersedia.");
    let _ = std::fs::remove_file(config);
}
