use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use std::time::Duration;
use tempfile::TempDir;
use windstat::{
    AnnualStatistic, Coverage, ErrorBody, ErrorKind, MemoryStore, SourceConfig, StatisticsStore,
    WindStat,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::ZipWriter;

// The city sits at (50.0, 6.0). "Nah" is about 10 km away, "Weiter" about 25 km and
// "Alt" is closest but stopped measuring long ago.
const DIRECTORY: &str = "Stations_id von_datum bis_datum Stationshoehe geoBreite geoLaenge Stationsname Bundesland\n\
----------- --------- --------- ------------- --------- --------- ----------------- ----------\n\
00003 19370101 20001231 202 50.01 6.0 Alt Nordrhein-Westfalen\n\
00001 19500101 20231231 100 50.09 6.0 Nah Nordrhein-Westfalen\n\
00002 19500101 20231231 150 50.225 6.0 Weiter Nordrhein-Westfalen\n";

const NAH_ARCHIVE: &str = "stundenwerte_FF_00001_19500101_20231231_hist.zip";
const WEITER_ARCHIVE: &str = "stundenwerte_FF_00002_19500101_20231231_hist.zip";

const WEITER_PRODUCT: &str = "STATIONS_ID;MESS_DATUM;QN_3;   F;   D;eor\n\
      2;2021060112;    5;   2.0; 230;eor\n\
      2;2021060113;    5;   4.0; 230;eor\n\
      2;2022060112;    5;   5.0; 230;eor\n\
      2;2022060113;    5;-999  ;-999;eor\n\
      2;2023060112;    5;   1.0; 230;eor\n\
      2;2023060113;    5;   2.0; 230;eor\n";

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn index_listing(archives: &[&str]) -> String {
    let links: String = archives
        .iter()
        .map(|name| format!("<a href=\"{name}\">{name}</a>   01-Apr-2024 09:00   12345\n"))
        .collect();
    format!(
        "<html><head><title>Index of /historical/</title></head><body><pre>\
         <a href=\"../\">../</a>\n{links}</pre></body></html>"
    )
}

fn stat(name: &str, year: i32, speed: f64) -> AnnualStatistic {
    AnnualStatistic {
        station_name: name.to_string(),
        year,
        speed,
    }
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("query", "Testdorf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"latitude": 50.0, "longitude": 6.0, "label": "Testdorf, Germany"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("query", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stations.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DIRECTORY))
        .mount(&server)
        .await;
    server
}

async fn mount_index(server: &MockServer, archives: &[&str], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/historical/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_listing(archives)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, name: &str, body: Vec<u8>, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/historical/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> SourceConfig {
    SourceConfig::builder()
        .geocoder_url(format!("{}/geocode", server.uri()))
        .geocoder_access_key("test-key")
        .station_directory_url(format!("{}/stations.txt", server.uri()))
        .archive_index_url(format!("{}/historical/", server.uri()))
        .build()
}

#[tokio::test]
async fn falls_through_to_station_with_archive() {
    let server = upstream().await;
    // The closer station has no archive in the listing at all.
    mount_index(&server, &[WEITER_ARCHIVE], 2).await;
    mount_archive(
        &server,
        WEITER_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00002.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();
    let statistics = client
        .wind_statistics()
        .city("Testdorf")
        .years(2)
        .call()
        .await
        .unwrap();

    assert_eq!(
        statistics,
        vec![stat("Weiter", 2023, 1.5), stat("Weiter", 2022, 5.0)]
    );
    assert!(!client.store().statistics_exist("Nah").await.unwrap());
    assert!(!client.store().statistics_exist("Alt").await.unwrap());
}

#[tokio::test]
async fn falls_through_when_archive_has_no_product_file() {
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE, WEITER_ARCHIVE], 2).await;
    mount_archive(
        &server,
        NAH_ARCHIVE,
        zip_with(&[("Metadaten_Geographie_00001.txt", "meta")]),
        1,
    )
    .await;
    mount_archive(
        &server,
        WEITER_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00002.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();
    let statistics = client
        .wind_statistics()
        .city("Testdorf")
        .years(10)
        .call()
        .await
        .unwrap();
    let years: Vec<i32> = statistics.iter().map(|s| s.year).collect();
    assert_eq!(years, [2023, 2022, 2021]);
    assert_eq!(statistics[2].speed, 3.0);
}

#[tokio::test]
async fn station_with_only_missing_values_is_skipped() {
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE, WEITER_ARCHIVE], 2).await;
    mount_archive(
        &server,
        NAH_ARCHIVE,
        zip_with(&[(
            "produkt_ff_stunde_00001.txt",
            "STATIONS_ID;MESS_DATUM;QN_3;F;D;eor\n1;2023010101;5;-999;-999;eor\n",
        )]),
        1,
    )
    .await;
    mount_archive(
        &server,
        WEITER_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00002.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();
    let statistics = client
        .wind_statistics()
        .city("Testdorf")
        .years(1)
        .call()
        .await
        .unwrap();
    assert_eq!(statistics, vec![stat("Weiter", 2023, 1.5)]);
}

#[tokio::test]
async fn cache_hit_downloads_nothing_again() {
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE], 1).await;
    mount_archive(
        &server,
        NAH_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00001.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();
    for _ in 0..2 {
        let statistics = client
            .wind_statistics()
            .city("Testdorf")
            .years(3)
            .call()
            .await
            .unwrap();
        assert_eq!(statistics.len(), 3);
        assert_eq!(statistics[0].station_name, "Nah");
    }

    let nah = client.store().station_by_name("Nah").await.unwrap();
    assert_eq!(client.ensure_statistics(&nah).await.unwrap(), Coverage::Cached);
}

#[tokio::test]
async fn concurrent_requests_build_once() {
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE], 1).await;
    mount_archive(
        &server,
        NAH_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00001.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();
    let (first, second) = tokio::join!(
        client.wind_statistics().city("Testdorf").years(3).call(),
        client.wind_statistics().city("Testdorf").years(3).call()
    );
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn stalled_archive_download_is_an_upstream_error() {
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE, WEITER_ARCHIVE], 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/historical/{NAH_ARCHIVE}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(zip_with(&[("produkt_ff_stunde_00001.txt", WEITER_PRODUCT)]))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_archive(&server, WEITER_ARCHIVE, Vec::new(), 0).await;

    let config = SourceConfig {
        request_timeout: Duration::from_millis(200),
        ..config(&server)
    };
    let client = WindStat::with_store(MemoryStore::new(), config).unwrap();
    let err = client
        .wind_statistics()
        .city("Testdorf")
        .years(2)
        .call()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(!err.is_missing_source());
    assert!(!client.store().statistics_exist("Nah").await.unwrap());
}

#[tokio::test]
async fn not_found_cases_have_distinct_messages() {
    let server = upstream().await;
    mount_index(&server, &[], 2).await;
    let client = WindStat::with_store(MemoryStore::new(), config(&server)).unwrap();

    let unknown_city = client
        .wind_statistics()
        .city("Atlantis")
        .years(3)
        .call()
        .await
        .unwrap_err();
    assert_eq!(unknown_city.kind(), ErrorKind::NotFound);
    assert_eq!(
        ErrorBody::from_error(&unknown_city),
        ErrorBody {
            code: 404,
            message: "city not found, please, check city name".to_string(),
        }
    );

    // "Alt" is filtered out by coverage and both remaining candidates lack archives.
    let no_data = client
        .wind_statistics()
        .city("Testdorf")
        .years(3)
        .call()
        .await;
    let no_data = no_data.unwrap_err();
    assert_eq!(no_data.kind(), ErrorKind::NotFound);
    assert_eq!(
        ErrorBody::from_error(&no_data).message,
        "unfortunately, there is no statistics available for the nearest weather station for this period"
    );
}

#[tokio::test]
async fn file_store_keeps_statistics_across_clients() {
    let cache = TempDir::new().unwrap();
    let server = upstream().await;
    mount_index(&server, &[NAH_ARCHIVE], 1).await;
    mount_archive(
        &server,
        NAH_ARCHIVE,
        zip_with(&[("produkt_ff_stunde_00001.txt", WEITER_PRODUCT)]),
        1,
    )
    .await;

    let first = WindStat::with_cache_folder(cache.path().to_path_buf(), config(&server))
        .await
        .unwrap();
    let built = first
        .wind_statistics()
        .city("Testdorf")
        .years(2)
        .call()
        .await
        .unwrap();
    drop(first);

    let second = WindStat::with_cache_folder(cache.path().to_path_buf(), config(&server))
        .await
        .unwrap();
    let cached = second
        .wind_statistics()
        .city("Testdorf")
        .years(2)
        .call()
        .await
        .unwrap();
    assert_eq!(built, cached);
}
