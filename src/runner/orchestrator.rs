//! @ai:module:intent Batch fan-out of model verifiers under bounded concurrency and deadlines
//! @ai:module:layer application
//! @ai:module:public_api VerificationOrchestrator, VerificationTask
//! @ai:module:stateless false

use crate::client::{ClientFactory, ProbeClientTrait, RemoteModel};
use crate::config::{ModelEndpoint, VerifierConfig};
use crate::error::{ClientError, Error, Result};
use crate::results::{ResultSet, VerificationResult};
use crate::scoring::ScoringEngine;
use crate::verifier::ModelVerifier;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

/// @ai:intent One (endpoint, model) pair to verify
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationTask {
    pub endpoint: ModelEndpoint,
    pub model_id: String,
    /// Failure recorded before the task ran; the verifier is skipped.
    pub preset_error: Option<String>,
}

impl VerificationTask {
    pub fn new(endpoint: &ModelEndpoint, model_id: &str) -> Self {
        let mut endpoint = endpoint.clone();
        endpoint.model = Some(model_id.to_string());
        Self {
            endpoint,
            model_id: model_id.to_string(),
            preset_error: None,
        }
    }

    /// @ai:intent Task that is represented in the results but never runs
    /// @ai:effects pure
    pub fn failed(endpoint: &ModelEndpoint, model_id: &str, error: String) -> Self {
        Self {
            endpoint: endpoint.clone(),
            model_id: model_id.to_string(),
            preset_error: Some(error),
        }
    }

    fn initial_result(&self) -> VerificationResult {
        let mut result =
            VerificationResult::new(&self.model_id, &self.endpoint.name, &self.endpoint.base_url);
        result.error = self.preset_error.clone();
        result
    }
}

/// @ai:intent Runs the model verifier for every task and scores the collected results
pub struct VerificationOrchestrator<F: ClientFactory> {
    factory: F,
    config: VerifierConfig,
    verifier: ModelVerifier,
    scoring: ScoringEngine,
}

impl<F: ClientFactory> VerificationOrchestrator<F> {
    /// @ai:intent Create an orchestrator; the config is assumed validated
    /// @ai:effects pure
    pub fn new(factory: F, config: VerifierConfig) -> Self {
        let verifier = ModelVerifier::new(&config);
        let scoring = ScoringEngine::new(config.scoring.clone());
        Self {
            factory,
            config,
            verifier,
            scoring,
        }
    }

    pub fn with_verifier(mut self, verifier: ModelVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// @ai:intent Verify every configured model, or every discovered one when none are configured
    /// @ai:pre config passed validation
    /// @ai:effects network, time
    pub async fn verify_all(&self, configured: &[ModelEndpoint]) -> Result<ResultSet> {
        let started_at = Utc::now();
        let tasks = self.plan_tasks(configured).await?;

        tracing::info!(
            "Verifying {} models (concurrency {}, deadline {}s)",
            tasks.len(),
            self.config.run.concurrency,
            self.config.run.timeout_secs
        );

        let mut results: Vec<VerificationResult> =
            tasks.iter().map(VerificationTask::initial_result).collect();
        self.run_tasks(&tasks, &mut results).await;

        for (result, task) in results.iter_mut().zip(&tasks) {
            result.performance = self
                .scoring
                .with_pricing(task.endpoint.pricing)
                .score(result);
        }

        Ok(ResultSet {
            started_at,
            finished_at: Utc::now(),
            results,
        })
    }

    /// @ai:intent Turn configured endpoints into tasks, listing models where needed
    /// @ai:effects network
    pub async fn plan_tasks(&self, configured: &[ModelEndpoint]) -> Result<Vec<VerificationTask>> {
        let tasks = if configured.is_empty() {
            self.discover().await?
        } else {
            let mut tasks = Vec::new();
            for endpoint in configured {
                match &endpoint.model {
                    Some(model_id) => tasks.push(VerificationTask::new(endpoint, model_id)),
                    None => tasks.extend(self.expand_endpoint(endpoint).await),
                }
            }
            tasks
        };

        if tasks.is_empty() {
            return Err(Error::NoTasks);
        }
        Ok(tasks)
    }

    /// @ai:intent List models at the global endpoint, one task per model
    /// @ai:effects network
    pub async fn discover(&self) -> Result<Vec<VerificationTask>> {
        let endpoint = ModelEndpoint::from_global(&self.config.global);
        tracing::info!("No models configured, discovering models at {}", endpoint.base_url);

        let models = self
            .list_models(&endpoint)
            .await
            .map_err(|source| Error::Discovery {
                endpoint: endpoint.base_url.clone(),
                source,
            })?;

        tracing::info!("Discovered {} models", models.len());
        Ok(models
            .iter()
            .map(|model| VerificationTask::new(&endpoint, &model.id))
            .collect())
    }

    /// @ai:intent One task per listed model; a listing failure yields one failed task
    /// @ai:effects network
    pub async fn expand_endpoint(&self, endpoint: &ModelEndpoint) -> Vec<VerificationTask> {
        match self.list_models(endpoint).await {
            Ok(models) => {
                tracing::debug!("{} lists {} models", endpoint.name, models.len());
                models
                    .iter()
                    .map(|model| VerificationTask::new(endpoint, &model.id))
                    .collect()
            }
            Err(err) => {
                tracing::warn!("Could not list models at {}: {}", endpoint.name, err);
                vec![VerificationTask::failed(
                    endpoint,
                    &endpoint.name,
                    format!("failed to list models: {}", err),
                )]
            }
        }
    }

    async fn list_models(
        &self,
        endpoint: &ModelEndpoint,
    ) -> std::result::Result<Vec<RemoteModel>, ClientError> {
        let client = self.factory.create(endpoint)?;
        client.list_models().await
    }

    /// @ai:intent Drive every task to completion or to the batch deadline
    /// @ai:pre results has one slot per task, in task order
    /// @ai:effects network, time
    pub async fn run_tasks(&self, tasks: &[VerificationTask], results: &mut [VerificationResult]) {
        let total = tasks.len();
        let batch_timeout = self.config.run.batch_timeout();
        let deadline = tokio::time::Instant::now() + batch_timeout;
        let semaphore = Semaphore::new(self.config.run.concurrency.max(1));
        let mut completed = vec![false; total];

        {
            let mut pending: FuturesUnordered<_> = results
                .iter_mut()
                .zip(tasks)
                .enumerate()
                .map(|(idx, (slot, task))| {
                    let semaphore = &semaphore;
                    async move {
                        self.run_task(task, slot, semaphore).await;
                        idx
                    }
                })
                .collect();

            let drained = tokio::time::timeout_at(deadline, async {
                let mut done = 0usize;
                while let Some(idx) = pending.next().await {
                    completed[idx] = true;
                    done += 1;
                    tracing::info!(
                        "[{}/{}] Finished {} at {}",
                        done,
                        total,
                        tasks[idx].model_id,
                        tasks[idx].endpoint.name
                    );
                }
            })
            .await;

            if drained.is_err() {
                tracing::warn!(
                    "Batch deadline of {:?} exceeded, cancelling {} unfinished verifications",
                    batch_timeout,
                    completed.iter().filter(|done| !**done).count()
                );
            }
        }

        for (slot, done) in results.iter_mut().zip(&completed) {
            if !done {
                slot.error = Some(format!(
                    "verification timed out: batch deadline of {:?} exceeded",
                    batch_timeout
                ));
            }
        }
    }

    /// @ai:intent Verify one task into its slot under the per-model timeout
    /// @ai:effects network, time
    async fn run_task(
        &self,
        task: &VerificationTask,
        slot: &mut VerificationResult,
        semaphore: &Semaphore,
    ) {
        if slot.error.is_some() {
            return;
        }

        let Ok(_permit) = semaphore.acquire().await else {
            slot.error = Some("verification cancelled: worker pool closed".to_string());
            return;
        };

        let client = match self.factory.create(&task.endpoint) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!("Failed to create client for {}: {}", task.endpoint.name, err);
                slot.error = Some(format!("failed to create client: {}", err));
                return;
            }
        };

        let model_timeout = self.config.run.model_timeout();
        let outcome = tokio::time::timeout(
            model_timeout,
            self.verifier.run_probes(&client, &task.endpoint, &mut *slot),
        )
        .await;

        if outcome.is_err() {
            tracing::warn!(
                "Verification of {} timed out after {:?}",
                task.model_id,
                model_timeout
            );
            slot.error = Some(format!("verification timed out after {:?}", model_timeout));
        }
    }
}
