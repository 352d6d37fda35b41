use async_trait::async_trait;
use parking_lot::Mutex;
use pathfinder_core::{
    GenerationError, GenerativeService, IdeasRequest, IdeasResponse, PlanRequest, PlanResponse,
    ReportRequest, ReportResponse, SynthesisRequest, SynthesisResponse,
};
use std::collections::VecDeque;

type Queue<T> = Mutex<VecDeque<Result<T, GenerationError>>>;

/// Calls received per request shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallLog {
    pub report: usize,
    pub ideas: usize,
    pub synthesis: usize,
    pub plan: usize,
}

impl CallLog {
    pub fn total(&self) -> usize {
        self.report + self.ideas + self.synthesis + self.plan
    }
}

/// Generator answering from per-shape queues
///
/// An exhausted queue answers with `GenerationError::Service`.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    reports: Queue<String>,
    ideas: Queue<Vec<String>>,
    synthesis: Queue<String>,
    plans: Queue<String>,
    calls: Mutex<CallLog>,
    ideas_requests: Mutex<Vec<IdeasRequest>>,
    synthesis_requests: Mutex<Vec<SynthesisRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(self, text: &str) -> Self {
        self.reports.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn with_ideas(self, ideas: &[&str]) -> Self {
        self.ideas
            .lock()
            .push_back(Ok(ideas.iter().map(|s| (*s).to_string()).collect()));
        self
    }

    pub fn with_ideas_error(self, err: GenerationError) -> Self {
        self.ideas.lock().push_back(Err(err));
        self
    }

    pub fn with_synthesis(self, text: &str) -> Self {
        self.synthesis.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn with_plan(self, text: &str) -> Self {
        self.plans.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn with_plan_error(self, err: GenerationError) -> Self {
        self.plans.lock().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> CallLog {
        *self.calls.lock()
    }

    pub fn ideas_requests(&self) -> Vec<IdeasRequest> {
        self.ideas_requests.lock().clone()
    }

    pub fn synthesis_requests(&self) -> Vec<SynthesisRequest> {
        self.synthesis_requests.lock().clone()
    }
}

fn next<T>(queue: &Queue<T>, shape: &str) -> Result<T, GenerationError> {
    queue
        .lock()
        .pop_front()
        .unwrap_or_else(|| Err(GenerationError::Service(format!("no scripted {shape} response"))))
}

#[async_trait]
impl GenerativeService for ScriptedGenerator {
    async fn report(&self, _request: ReportRequest) -> Result<ReportResponse, GenerationError> {
        self.calls.lock().report += 1;
        next(&self.reports, "report").map(|report| ReportResponse { report })
    }

    async fn ideas(&self, request: IdeasRequest) -> Result<IdeasResponse, GenerationError> {
        self.calls.lock().ideas += 1;
        self.ideas_requests.lock().push(request);
        next(&self.ideas, "ideas").map(|ideas| IdeasResponse { ideas })
    }

    async fn synthesis(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, GenerationError> {
        self.calls.lock().synthesis += 1;
        self.synthesis_requests.lock().push(request);
        next(&self.synthesis, "synthesis").map(|text| SynthesisResponse { text })
    }

    async fn plan(&self, _request: PlanRequest) -> Result<PlanResponse, GenerationError> {
        self.calls.lock().plan += 1;
        next(&self.plans, "plan").map(|plan| PlanResponse { plan })
    }
}
