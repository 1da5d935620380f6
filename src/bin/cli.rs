use std::process;
use std::time::Duration;

use clap::Parser;

use softap_portal::{FormDecoding, PortalConfig, ProvisioningPortal, TcpPortalListener};

/// softap-portal CLI — host-side provisioning portal.
///
/// Binds a TCP listener, serves the configuration form to the first GET,
/// and blocks until a POST submission completes, then prints the captured
/// values. Point a browser (or curl) at the bound address to drive it.
#[derive(Parser)]
#[command(name = "softap-portal-cli", version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Per-read timeout in milliseconds; stalled peers are dropped instead
    /// of hanging the portal. Omit to poll forever (device behavior).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Decode the form body by key lookup instead of the device's ordinal
    /// first-and-last-ampersand split.
    #[arg(long)]
    generic_form: bool,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON object with ssid, password, display_ip
    Json,
    /// One value per line
    Plain,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let listener = match TcpPortalListener::bind(&cli.bind) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error binding {}: {e}", cli.bind);
            process::exit(1);
        }
    };
    if let Ok(addr) = listener.local_addr() {
        eprintln!("Portal listening on http://{addr}/");
    }

    let config = PortalConfig {
        read_timeout: cli.timeout_ms.map(Duration::from_millis),
        form_decoding: if cli.generic_form {
            FormDecoding::Generic
        } else {
            FormDecoding::Ordinal
        },
        ..PortalConfig::default()
    };

    let result = ProvisioningPortal::new(listener, config).run();

    match cli.format {
        OutputFormat::Json => println!("{}", result.to_json(cli.pretty)),
        OutputFormat::Plain => {
            println!("ssid: {}", result.ssid);
            println!("password: {}", result.password);
            println!("display_ip: {}", result.display_ip);
        }
    }
}
