//! Courier - send one HTTP request and print the decomposed response.

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use http::Method;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use courier::headers::names;
use courier::url::parse_query;
use courier::{Client, ClientConfig, Exchange};

/// Courier - a small HTTP client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL to request
    url: String,

    /// Request method
    #[arg(short = 'X', long = "request", default_value = "GET")]
    method: String,

    /// Request header, `Name: Value`
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request cookie, `name=value`
    #[arg(short = 'b', long = "cookie")]
    cookies: Vec<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Send the body as JSON
    #[arg(long)]
    json: bool,

    /// Query parameter merged into the URL, `key=value`
    #[arg(short, long)]
    query: Vec<String>,

    /// Proxy URL
    #[arg(short = 'x', long)]
    proxy: Option<String>,

    /// Follow redirects
    #[arg(short = 'L', long)]
    location: bool,

    /// Skip TLS peer verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// User agent string
    #[arg(long)]
    user_agent: Option<String>,

    /// Print status line, headers and cookies before the body
    #[arg(short, long)]
    include: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ClientConfig {
        follow_redirects: args.location,
        verify_peer: !args.insecure,
        timeout: Duration::from_secs(args.timeout),
        ..ClientConfig::default()
    };
    if let Some(user_agent) = &args.user_agent {
        config.user_agent = user_agent.clone();
    }

    let mut client = Client::with_config(config)?;
    configure(&mut client, &args)?;

    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method: {}", args.method))?;

    let response = client.execute(method, &args.url);
    let exchange = response.into_result()?;

    if let Some(header) = &exchange.request_header {
        debug!("request header:\n{}", header.trim_end());
    }

    print_exchange(&exchange, args.include)?;
    Ok(())
}

/// Apply headers, cookies, query, proxy and body to the client.
fn configure(client: &mut Client, args: &Args) -> Result<()> {
    let request = client.request_mut();

    for line in &args.headers {
        request.set_header_line(line)?;
    }

    for pair in &args.cookies {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("invalid cookie, expected name=value: {}", pair);
        };
        request.set_cookie(name.trim(), value.trim());
    }

    if !args.query.is_empty() {
        request.set_query(parse_query(&args.query.join("&")));
    }

    if let Some(proxy) = &args.proxy {
        request.set_proxy_url(proxy)?;
    }

    if let Some(data) = &args.data {
        if args.json {
            let value: serde_json::Value = serde_json::from_str(data).context("body is not valid JSON")?;
            request.set_body(value, true);
        } else {
            request.set_body(data.as_str(), false);
        }
    }

    Ok(())
}

fn print_exchange(exchange: &Exchange, include: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if include {
        for (name, values) in exchange.headers.iter() {
            if name == names::SET_COOKIE {
                continue;
            }
            for value in values {
                if name == names::STATUS {
                    writeln!(out, "{}", value)?;
                } else {
                    writeln!(out, "{}: {}", name, value)?;
                }
            }
        }
        for cookie in exchange.cookies.values() {
            writeln!(out, "{}", cookie.to_set_cookie())?;
        }
        writeln!(out)?;
    }

    write!(out, "{}", exchange.text())?;
    out.flush()?;
    Ok(())
}
