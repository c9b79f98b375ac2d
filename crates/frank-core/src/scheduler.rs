// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Interval/on-demand driver for a [`RefreshSource`].

use crate::error::UpdateError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Something the scheduler can refresh periodically.
#[async_trait]
pub trait RefreshSource: Send {
    type Data: Send + Sync + 'static;

    fn name(&self) -> &str;

    fn update_interval(&self) -> Duration;

    /// Produce the data for this cycle or explain why there is none
    async fn refresh(&mut self) -> Result<Arc<Self::Data>, UpdateError>;
}

/// Result of the most recent cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Pending,
    Ok { at: DateTime<Utc> },
    Failed(String),
    ReauthRequired(String),
}

impl UpdateStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Cloneable trigger for on-demand refreshes
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Ask for a refresh as soon as the current cycle finishes.
    ///
    /// Returns `false` once the scheduler has stopped. Requests made while one
    /// is already queued are merged into it.
    pub fn request_refresh(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

/// Runs one refresh at a time and publishes data and status over watch channels.
///
/// Published data is only replaced by successful cycles; a failed cycle
/// leaves the last good data in place and only changes the status.
pub struct UpdateScheduler<S: RefreshSource> {
    source: S,
    data_tx: watch::Sender<Option<Arc<S::Data>>>,
    status_tx: watch::Sender<UpdateStatus>,
    request_tx: mpsc::Sender<()>,
    request_rx: mpsc::Receiver<()>,
}

impl<S: RefreshSource> fmt::Debug for UpdateScheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateScheduler")
            .field("source", &self.source.name())
            .field("status", &*self.status_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl<S: RefreshSource> UpdateScheduler<S> {
    pub fn new(source: S) -> Self {
        let (data_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(UpdateStatus::Pending);
        let (request_tx, request_rx) = mpsc::channel(1);

        Self {
            source,
            data_tx,
            status_tx,
            request_tx,
            request_rx,
        }
    }

    pub fn handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.request_tx.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<S::Data>>> {
        self.data_tx.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<UpdateStatus> {
        self.status_tx.subscribe()
    }

    /// Run a single cycle right away and return its status
    pub async fn refresh_now(&mut self) -> UpdateStatus {
        let name = self.source.name().to_string();
        debug!("Refreshing {}", name);

        let status = match self.source.refresh().await {
            Ok(data) => {
                self.data_tx.send_replace(Some(data));
                UpdateStatus::Ok { at: Utc::now() }
            }
            Err(UpdateError::UpdateFailed(msg)) => {
                warn!("{}: update failed: {}", name, msg);
                UpdateStatus::Failed(msg)
            }
            Err(UpdateError::ReauthRequired(msg)) => {
                error!("{}: reauthentication required: {}", name, msg);
                UpdateStatus::ReauthRequired(msg)
            }
        };

        self.status_tx.send_replace(status.clone());
        status
    }

    /// Refresh immediately, then on every interval tick and every request,
    /// until `shutdown` completes.
    ///
    /// After a reauthentication failure interval refreshes stop; only an
    /// explicit request resumes polling.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let update_interval = self.source.update_interval();
        info!(
            "Starting {} (interval: {:?})",
            self.source.name(),
            update_interval
        );

        let mut interval = tokio::time::interval(update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut waiting_for_reauth = false;

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Stopping {}", self.source.name());
                    break;
                }
                _ = interval.tick(), if !waiting_for_reauth => {
                    let status = self.refresh_now().await;
                    waiting_for_reauth = matches!(status, UpdateStatus::ReauthRequired(_));
                }
                Some(()) = self.request_rx.recv() => {
                    let status = self.refresh_now().await;
                    waiting_for_reauth = matches!(status, UpdateStatus::ReauthRequired(_));
                    interval.reset();
                }
            }
        }
    }
}
