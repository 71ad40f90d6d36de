//! Prometheus metrics for the state engine.
//!
//! Mirrors the teacher's metrics-module shape: one [`EngineMetrics`]
//! struct owning every collector, registered against a single
//! [`prometheus::Registry`], exposed over HTTP by [`prometheus_exporter`].

pub mod prometheus_exporter;

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_with_registry, HistogramVec, IntCounterVec, IntGauge, Registry,
};

/// Every metric this engine emits, grouped under one registry so the
/// `/metrics` handler only needs to gather once.
#[derive(Clone)]
pub struct EngineMetrics {
    pub registry: Registry,
    /// Wall-clock seconds spent in `StateEngine::process_block`.
    pub block_processing_seconds: HistogramVec,
    /// Operations committed, labeled by opcode character.
    pub ops_accepted_total: IntCounterVec,
    /// Operations rejected at the check stage, labeled by opcode
    /// character.
    pub ops_rejected_total: IntCounterVec,
    /// Currently-live names.
    pub active_names: IntGauge,
    /// Currently-ready namespaces.
    pub active_namespaces: IntGauge,
    /// Wall-clock seconds spent in `engine::snv::verify_block`.
    pub snv_verify_seconds: HistogramVec,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let block_processing_seconds = register_histogram_vec_with_registry!(
            "nameset_block_processing_seconds",
            "Time spent processing one block's operations",
            &["result"],
            registry
        )?;
        let ops_accepted_total = register_int_counter_vec_with_registry!(
            "nameset_ops_accepted_total",
            "Operations committed, by opcode",
            &["opcode"],
            registry
        )?;
        let ops_rejected_total = register_int_counter_vec_with_registry!(
            "nameset_ops_rejected_total",
            "Operations rejected at the check stage, by opcode",
            &["opcode"],
            registry
        )?;
        let active_names = register_int_gauge_with_registry!(
            "nameset_active_names",
            "Currently-live name records",
            registry
        )?;
        let active_namespaces = register_int_gauge_with_registry!(
            "nameset_active_namespaces",
            "Currently-ready namespaces",
            registry
        )?;
        let snv_verify_seconds = register_histogram_vec_with_registry!(
            "nameset_snv_verify_seconds",
            "Time spent reconstructing and checking an SNV snapshot",
            &["result"],
            registry
        )?;

        Ok(EngineMetrics {
            registry,
            block_processing_seconds,
            ops_accepted_total,
            ops_rejected_total,
            active_names,
            active_namespaces,
            snv_verify_seconds,
        })
    }

    pub fn record_accepted(&self, opcode: char) {
        self.ops_accepted_total
            .with_label_values(&[&opcode.to_string()])
            .inc();
    }

    pub fn record_rejected(&self, opcode: char) {
        self.ops_rejected_total
            .with_label_values(&[&opcode.to_string()])
            .inc();
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new().expect("metric registration uses fixed, non-colliding names")
    }
}
