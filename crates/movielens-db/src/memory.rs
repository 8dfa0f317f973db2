//! In-memory gateway for dry runs and tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use movielens_model::{Procedure, ResultRow};
use tracing::trace;

use crate::error::{DbError, Result};
use crate::gateway::{ProcedureCall, ProcedureGateway, ProcedureOutcome};

/// Gateway that records calls instead of reaching a database.
///
/// Read procedures answer with rows registered through [`with_rows`]
/// (empty otherwise). Procedures registered through [`failing`] are
/// rejected, which lets callers exercise per-row failure handling.
///
/// [`with_rows`]: MemoryGateway::with_rows
/// [`failing`]: MemoryGateway::failing
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    calls: Vec<ProcedureCall>,
    statements: Vec<(String, String)>,
    responses: HashMap<Procedure, Vec<ResultRow>>,
    failing: HashSet<Procedure>,
    closed: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(self, procedure: Procedure, rows: Vec<ResultRow>) -> Self {
        self.lock().responses.insert(procedure, rows);
        self
    }

    #[must_use]
    pub fn failing(self, procedure: Procedure) -> Self {
        self.lock().failing.insert(procedure);
        self
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<ProcedureCall> {
        self.lock().calls.clone()
    }

    pub fn calls_to(&self, procedure: Procedure) -> Vec<ProcedureCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.procedure == procedure)
            .cloned()
            .collect()
    }

    /// Statements passed to `execute`, as `(schema, statement)` pairs.
    pub fn statements(&self) -> Vec<(String, String)> {
        self.lock().statements.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProcedureGateway for MemoryGateway {
    async fn invoke(&self, call: ProcedureCall) -> Result<ProcedureOutcome> {
        let mut state = self.lock();
        if state.closed {
            return Err(DbError::Rejected {
                procedure: call.qualified_name(),
                message: "gateway closed".to_string(),
            });
        }
        trace!(procedure = %call.qualified_name(), params = call.params.len(), "recorded call");
        let procedure = call.procedure;
        let expect_rows = call.expect_rows;
        let lowercase_keys = call.lowercase_keys;
        let qualified = call.qualified_name();
        state.calls.push(call);

        if state.failing.contains(&procedure) {
            return Err(DbError::Rejected {
                procedure: qualified,
                message: "configured to fail".to_string(),
            });
        }
        if !expect_rows {
            return Ok(ProcedureOutcome {
                out_param: None,
                row_count: 0,
                rows: Vec::new(),
            });
        }
        let rows: Vec<ResultRow> = state
            .responses
            .get(&procedure)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|row| if lowercase_keys { row.into_lowercase_keys() } else { row })
            .collect();
        Ok(ProcedureOutcome {
            out_param: None,
            row_count: rows.len(),
            rows,
        })
    }

    async fn execute(&self, schema: &str, statement: &str) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(DbError::Rejected {
                procedure: statement.to_string(),
                message: "gateway closed".to_string(),
            });
        }
        state
            .statements
            .push((schema.to_string(), statement.to_string()));
        Ok(())
    }

    async fn close(&self) {
        self.lock().closed = true;
    }
}
