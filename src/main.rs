use clap::Parser;
use firehose_capture::kafka::{EventProducer, KafkaAdmin};
use firehose_capture::registry::SchemaRegistryClient;
use firehose_capture::source::{KafkaStatusListener, StatusListener, StreamSource};
use firehose_capture::{Config, Error, Result, StartupGate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "firehose-capture")]
#[command(about = "Social status firehose to Kafka ingestion bridge", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting firehose-capture");
    info!("Loading configuration from {:?}", args.config);

    let config = match Config::from_file(&args.config) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(Error::Config(e.to_string()));
        }
    };
    config.validate()?;

    info!(
        kafka_brokers = ?config.kafka.brokers,
        kafka_topic = %config.kafka.topic_name,
        topics_to_create = ?config.kafka.topic_names_to_create,
        schema_registry_url = %config.kafka.schema_registry_url,
        keywords = ?config.stream.keywords,
        mock_stream = config.stream.enable_mock_stream,
        "Configuration summary"
    );

    let admin = KafkaAdmin::new(&config.kafka.brokers)?;
    let registry = SchemaRegistryClient::new(
        config.kafka.schema_registry_url.clone(),
        Duration::from_secs(config.kafka.registry_timeout_secs),
    )?;
    let gate = StartupGate::new(admin, registry, config.retry.clone());

    gate.ensure_topics(&config.topic_specs()).await?;
    gate.await_schema_registry().await?;
    info!(
        topics = ?config.kafka.topic_names_to_create,
        "Topics are ready for operations"
    );

    let producer = Arc::new(EventProducer::new(&config.kafka.brokers, &config.kafka)?);
    let listener: Arc<dyn StatusListener> = Arc::new(KafkaStatusListener::new(
        config.kafka.topic_name.clone(),
        Arc::clone(&producer),
    ));

    let mut source = StreamSource::from_config(&config, listener);
    source.start();

    info!("Capture running, waiting for shutdown signal");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down");
    source.stop();
    producer.close();

    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("firehose_capture=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("firehose_capture=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
