use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use windstat::{
    ErrorBody, ErrorKind, SourceConfig, WindRequest, WindStat, WindStatError, YearSpeed,
    DEFAULT_ARCHIVE_INDEX_URL, DEFAULT_GEOCODER_URL, DEFAULT_STATION_DIRECTORY_URL,
};

#[derive(Parser)]
#[command(name = "windstat")]
#[command(about = "Annual average wind speed at the DWD station nearest to a city")]
#[command(version)]
struct Cli {
    #[arg(short, long, help = "City to look up")]
    city: Option<String>,

    #[arg(short, long, help = "Number of most recent years to return")]
    years: Option<String>,

    #[arg(long, env = "GEO_API_URL", default_value = DEFAULT_GEOCODER_URL)]
    geo_api_url: String,

    #[arg(long, env = "GEO_API_ACCESS_KEY", hide_env_values = true)]
    geo_api_access_key: Option<String>,

    #[arg(long, env = "STATIONS_INFO_URL", default_value = DEFAULT_STATION_DIRECTORY_URL)]
    stations_info_url: String,

    #[arg(
        long,
        env = "HOURLY_WIND_HISTORICAL_DATA_URL",
        default_value = DEFAULT_ARCHIVE_INDEX_URL
    )]
    hourly_wind_historical_data_url: String,

    #[arg(long, env = "WINDSTAT_CACHE_DIR", help = "Store directory [default: platform cache dir]")]
    cache_dir: Option<PathBuf>,

    #[arg(long, env = "WINDSTAT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,
}

async fn run(cli: Cli) -> Result<Vec<YearSpeed>, WindStatError> {
    let request = WindRequest::from_params(cli.city.as_deref(), cli.years.as_deref())?;

    let config = SourceConfig::builder()
        .geocoder_url(cli.geo_api_url)
        .maybe_geocoder_access_key(cli.geo_api_access_key)
        .station_directory_url(cli.stations_info_url)
        .archive_index_url(cli.hourly_wind_historical_data_url)
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .build();
    let client = match cli.cache_dir {
        Some(dir) => WindStat::with_cache_folder(dir, config).await?,
        None => WindStat::new(config).await?,
    };

    let statistics = client
        .wind_statistics()
        .city(request.city)
        .years(request.years)
        .call()
        .await?;
    Ok(statistics.iter().map(YearSpeed::from).collect())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(speeds) => {
            print_json(&speeds);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_json(&ErrorBody::from_error(&e));
            if e.kind() == ErrorKind::Validation {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
