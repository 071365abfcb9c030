use std::collections::HashMap;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::Router;
use runtime::AppConfig;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::rest::{self, RestState};
use crate::config::HealthAnalyticsConfig;
use crate::contract::model::{
    GeneticData, HealthRecommendation, LifestyleData, MedicalRecord, WearableData,
};
use crate::contract::{EntityKind, HealthAnalyticsApi};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entity::Entity;
use crate::domain::ports::bus::{BusError, TopicReader};
use crate::domain::ports::notify::NotificationSink;
use crate::domain::repo::DocumentStore;
use crate::domain::repository::Repository;
use crate::domain::summary::SummaryAggregator;
use crate::gateways::local::HealthAnalyticsLocalClient;
use crate::infra::bus::{memory, MemoryPublisher, NatsTopicReader};
use crate::infra::notify::{InMemoryNotificationSink, NatsNotificationSink, NotificationDispatcher};
use crate::infra::storage::{InMemoryDocumentStore, MongoDocumentStore};
use crate::ingest::IngestPipeline;

pub const MODULE_NAME: &str = "health_analytics";

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One reader per record kind.
pub struct TopicReaders<R> {
    pub medical_record: R,
    pub genetic_data: R,
    pub lifestyle_data: R,
    pub wearable_data: R,
    pub health_recommendation: R,
}

impl<R> TopicReaders<R> {
    /// Build the set by calling `open` once per kind, in `EntityKind::ALL` order.
    pub async fn open<F, Fut, E>(mut open: F) -> Result<Self, E>
    where
        F: FnMut(EntityKind) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        Ok(Self {
            medical_record: open(EntityKind::MedicalRecord).await?,
            genetic_data: open(EntityKind::GeneticData).await?,
            lifestyle_data: open(EntityKind::LifestyleData).await?,
            wearable_data: open(EntityKind::WearableData).await?,
            health_recommendation: open(EntityKind::HealthRecommendation).await?,
        })
    }
}

/// Health analytics module: repositories, aggregator, consumers and REST facade
/// over one document store.
pub struct HealthAnalytics {
    config: HealthAnalyticsConfig,
    state: RestState,
}

impl HealthAnalytics {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        config: HealthAnalyticsConfig,
        call_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let zone = config.summary.zone()?;
        let state = RestState {
            medical_records: Arc::new(Repository::new(store.clone(), clock.clone())),
            genetic_data: Arc::new(Repository::new(store.clone(), clock.clone())),
            lifestyle_data: Arc::new(Repository::new(store.clone(), clock.clone())),
            wearable_data: Arc::new(Repository::new(store.clone(), clock.clone())),
            health_recommendations: Arc::new(Repository::new(store.clone(), clock.clone())),
            aggregator: Arc::new(SummaryAggregator::new(store, clock, zone)),
            call_timeout,
        };
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &HealthAnalyticsConfig {
        &self.config
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn HealthAnalyticsApi> {
        Arc::new(HealthAnalyticsLocalClient::new(
            self.state.medical_records.clone(),
            self.state.genetic_data.clone(),
            self.state.lifestyle_data.clone(),
            self.state.wearable_data.clone(),
            self.state.health_recommendations.clone(),
            self.state.aggregator.clone(),
        ))
    }

    pub fn router(&self) -> Router {
        rest::router(self.state.clone())
    }

    /// Start one ingest pipeline per kind. Each task only finishes on a fatal bus error.
    pub fn spawn_consumers<R>(
        &self,
        readers: TopicReaders<R>,
        notifier: Arc<dyn NotificationSink>,
    ) -> JoinSet<Result<(), BusError>>
    where
        R: TopicReader + 'static,
        R::Message: 'static,
    {
        let mut set = JoinSet::new();
        spawn_pipeline::<MedicalRecord, R>(
            &mut set,
            readers.medical_record,
            &self.state.medical_records,
            &notifier,
        );
        spawn_pipeline::<GeneticData, R>(
            &mut set,
            readers.genetic_data,
            &self.state.genetic_data,
            &notifier,
        );
        spawn_pipeline::<LifestyleData, R>(
            &mut set,
            readers.lifestyle_data,
            &self.state.lifestyle_data,
            &notifier,
        );
        spawn_pipeline::<WearableData, R>(
            &mut set,
            readers.wearable_data,
            &self.state.wearable_data,
            &notifier,
        );
        spawn_pipeline::<HealthRecommendation, R>(
            &mut set,
            readers.health_recommendation,
            &self.state.health_recommendations,
            &notifier,
        );
        set
    }

    /// Serve HTTP on `listener` until `shutdown` resolves or a consumer stops.
    ///
    /// A stopped consumer is fatal: its error is returned after the server drains.
    pub async fn serve<S>(
        &self,
        listener: TcpListener,
        mut consumers: JoinSet<Result<(), BusError>>,
        shutdown: S,
    ) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send,
    {
        let cancel = CancellationToken::new();
        let graceful = {
            let cancel = cancel.clone();
            async move { cancel.cancelled().await }
        };

        let addr = listener.local_addr()?;
        info!("HTTP server bound on {}", addr);
        let mut server = tokio::spawn(
            axum::serve(listener, self.router())
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        let outcome = tokio::select! {
            _ = shutdown => {
                info!("Shutdown requested");
                Ok(())
            }
            Some(joined) = consumers.join_next() => {
                let err = match joined {
                    Ok(Ok(())) => anyhow!("consumer stopped unexpectedly"),
                    Ok(Err(e)) => anyhow::Error::new(e),
                    Err(e) => anyhow!("consumer task failed: {e}"),
                };
                error!(error = %err, "Consumer failed, shutting down");
                Err(err)
            }
            res = &mut server => {
                return match res {
                    Ok(Ok(())) => Err(anyhow!("HTTP server exited unexpectedly")),
                    Ok(Err(e)) => Err(anyhow!(e)),
                    Err(e) => Err(anyhow!("HTTP server task failed: {e}")),
                };
            }
        };

        consumers.abort_all();
        cancel.cancel();
        info!("HTTP server shutting down gracefully");
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "HTTP server stopped with error"),
            Err(e) => warn!(error = %e, "HTTP server task failed"),
        }
        outcome
    }
}

fn spawn_pipeline<E, R>(
    set: &mut JoinSet<Result<(), BusError>>,
    reader: R,
    repo: &Arc<Repository<E>>,
    notifier: &Arc<dyn NotificationSink>,
) where
    E: Entity,
    R: TopicReader + 'static,
    R::Message: 'static,
{
    let pipeline = IngestPipeline::new(reader, repo.as_ref().clone(), notifier.clone());
    set.spawn(pipeline.run());
}

/// Wire the module from the application config and run it until shutdown.
///
/// With `mock`, the store, bus and notification sink are in-memory.
pub async fn run(app: AppConfig, mock: bool) -> anyhow::Result<()> {
    let config = HealthAnalyticsConfig::from_value(app.module_config(MODULE_NAME))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let call_timeout = match app.server.timeout_sec {
        0 => DEFAULT_CALL_TIMEOUT,
        secs => Duration::from_secs(secs),
    };

    let store: Arc<dyn DocumentStore> = match (&app.store, mock) {
        (_, true) => {
            info!("Using in-memory document store (--mock)");
            Arc::new(InMemoryDocumentStore::new())
        }
        (Some(cfg), false) => Arc::new(
            MongoDocumentStore::connect(&cfg.uri, &cfg.database)
                .await
                .context("failed to connect to the document store")?,
        ),
        (None, false) => {
            return Err(anyhow!(
                "no `store` section configured; add one or run with --mock"
            ))
        }
    };

    let module = HealthAnalytics::new(store, clock.clone(), config, call_timeout)?;
    let addr = format!("{}:{}", app.server.host, app.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let notify_cancel = CancellationToken::new();
    let queue_capacity = module.config().notifications.queue_capacity;

    // Publishers must outlive the run or in-memory consumers see a closed topic.
    let mut mock_publishers: HashMap<EntityKind, MemoryPublisher> = HashMap::new();

    let (consumers, dispatcher_task) = if mock {
        let sink: Arc<dyn NotificationSink> = Arc::new(InMemoryNotificationSink::new(clock));
        let (dispatcher, task) =
            NotificationDispatcher::spawn(sink, queue_capacity, notify_cancel.clone());
        let topics = &module.config().topics;
        let readers = TopicReaders::open(|kind| {
            let (publisher, reader) = memory::topic(topics.topic(kind));
            mock_publishers.insert(kind, publisher);
            async move { Ok::<_, BusError>(reader) }
        })
        .await?;
        (module.spawn_consumers(readers, Arc::new(dispatcher)), Some(task))
    } else if let Some(bus) = &app.bus {
        let client =
            crate::infra::bus::nats::connect(&bus.url, bus.user.as_deref(), bus.password.as_deref())
                .await?;
        let sink: Arc<dyn NotificationSink> = Arc::new(NatsNotificationSink::new(
            client.clone(),
            module.config().notifications.subject_prefix.clone(),
            clock,
        ));
        let (dispatcher, task) =
            NotificationDispatcher::spawn(sink, queue_capacity, notify_cancel.clone());
        let js = async_nats::jetstream::new(client);
        let topics = &module.config().topics;
        let readers = TopicReaders::open(|kind| {
            NatsTopicReader::subscribe(&js, topics.topic(kind), kind)
        })
        .await?;
        (module.spawn_consumers(readers, Arc::new(dispatcher)), Some(task))
    } else {
        warn!("No `bus` section configured; consumers are not started");
        (JoinSet::new(), None)
    };

    let shutdown = async {
        if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
            error!(error = %e, "Failed to install signal handlers");
        }
    };
    let result = module.serve(listener, consumers, shutdown).await;

    drop(mock_publishers);
    notify_cancel.cancel();
    if let Some(task) = dispatcher_task {
        if let Err(e) = task.await {
            warn!(error = %e, "Notification dispatcher task failed");
        }
    }
    result
}
