use super::analyze::render_insights;
use crate::llm::{generate_structured, BackendError};
use crate::output::{PlanningContext, WorkStream, WorkStreamCategory, WorkStreamPattern};
use crate::patterns::categories::dependency_rank;
use crate::pipeline::confidence::stream_confidence;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::PipelineStage;
use crate::progress::ProgressEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

const STAGE: &str = "optimizer";
const DEPENDENCY_STAGE: &str = "dependencies";

const MIN_DELIVERABLES: usize = 3;
const MAX_DELIVERABLES: usize = 5;

/// Called after each workstream is generated with `(current, total, name)`;
/// `current` is 1-based.
pub type StreamProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

pub struct OptimizerInput {
    pub pattern: WorkStreamPattern,
    pub context: PlanningContext,
    pub insights: Value,
    pub on_progress: Option<StreamProgressCallback>,
}

impl OptimizerInput {
    pub fn new(pattern: WorkStreamPattern, context: PlanningContext, insights: Value) -> Self {
        Self {
            pattern,
            context,
            insights,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, callback: StreamProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeneratedStream {
    name: String,
    description: String,
    deliverables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyLink {
    workstream_id: String,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DependencyMap {
    dependencies: Vec<DependencyLink>,
}

/// Expands each pattern category into a concrete workstream, then links
/// the workstreams with dependencies.
pub struct StreamOptimizer {
    context: PipelineContext,
}

impl StreamOptimizer {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    async fn generate_stream(
        &self,
        index: usize,
        category: &WorkStreamCategory,
        input: &OptimizerInput,
    ) -> Result<WorkStream, PipelineError> {
        let request = self.context.structured_request(
            STAGE,
            build_stream_prompt(category, input),
            stream_schema(),
        );

        let generated: GeneratedStream = generate_structured(
            self.context.llm_client.as_ref(),
            request,
            &self.context.heuristic_logger,
        )
        .await
        .map_err(PipelineError::llm(STAGE))?;

        let deliverables = normalize_deliverables(generated.deliverables);
        if deliverables.len() < MIN_DELIVERABLES {
            return Err(PipelineError::InvalidOutput {
                stage: STAGE,
                message: format!(
                    "workstream for {} has {} deliverables, expected at least {}",
                    category.category,
                    deliverables.len(),
                    MIN_DELIVERABLES
                ),
            });
        }

        Ok(WorkStream {
            id: workstream_id(index),
            name: generated.name,
            category: category.category.clone(),
            description: generated.description,
            proportional_effort: category.weight,
            priority: category.priority,
            deliverables,
            dependencies: Vec::new(),
            confidence: stream_confidence(category.priority, category.weight),
        })
    }

    async fn link_dependencies(
        &self,
        workstreams: &[WorkStream],
    ) -> Result<Vec<DependencyLink>, BackendError> {
        let client = self.context.dependency_client();
        debug!(
            model = client.model_info().as_deref().unwrap_or("default"),
            "Linking workstream dependencies"
        );

        let request = self.context.structured_request(
            DEPENDENCY_STAGE,
            build_dependency_prompt(workstreams),
            dependency_schema(),
        );

        let map: DependencyMap =
            generate_structured(client.as_ref(), request, &self.context.heuristic_logger).await?;
        Ok(map.dependencies)
    }
}

pub(crate) fn workstream_id(index: usize) -> String {
    format!("WS{:03}", index + 1)
}

fn normalize_deliverables(deliverables: Vec<String>) -> Vec<String> {
    deliverables
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .take(MAX_DELIVERABLES)
        .collect()
}

/// Merges LLM-proposed links into `workstreams`. Unknown ids and self
/// references are dropped; workstreams without a link keep no dependencies.
fn apply_dependency_links(workstreams: &mut [WorkStream], links: Vec<DependencyLink>) {
    let known: HashSet<String> = workstreams.iter().map(|ws| ws.id.clone()).collect();
    let mut by_id: HashMap<String, Vec<String>> = HashMap::new();

    for link in links {
        if !known.contains(&link.workstream_id) {
            debug!(id = %link.workstream_id, "Ignoring dependency link for unknown workstream");
            continue;
        }
        let deps = by_id.entry(link.workstream_id.clone()).or_default();
        for dep in link.depends_on {
            if dep != link.workstream_id && known.contains(&dep) && !deps.contains(&dep) {
                deps.push(dep);
            }
        }
    }

    for ws in workstreams.iter_mut() {
        ws.dependencies = by_id.remove(&ws.id).unwrap_or_default();
    }
}

/// Sequential chain in fixed category order: each workstream depends on the
/// one before it. Array order is left untouched.
pub fn infer_basic_dependencies(workstreams: &mut [WorkStream]) {
    let mut order: Vec<usize> = (0..workstreams.len()).collect();
    order.sort_by_key(|&i| dependency_rank(&workstreams[i].category));

    let mut chain: HashMap<usize, Vec<String>> = HashMap::new();
    for pair in order.windows(2) {
        chain.insert(pair[1], vec![workstreams[pair[0]].id.clone()]);
    }

    for (i, ws) in workstreams.iter_mut().enumerate() {
        ws.dependencies = chain.remove(&i).unwrap_or_default();
    }
}

fn stream_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "description": {"type": "string"},
            "deliverables": {
                "type": "array",
                "items": {"type": "string"},
                "minItems": MIN_DELIVERABLES,
                "maxItems": MAX_DELIVERABLES
            }
        },
        "required": ["name", "description", "deliverables"]
    })
}

fn dependency_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dependencies": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "workstreamId": {"type": "string"},
                        "dependsOn": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["workstreamId", "dependsOn"]
                }
            }
        },
        "required": ["dependencies"]
    })
}

fn build_stream_prompt(category: &WorkStreamCategory, input: &OptimizerInput) -> String {
    let business = &input.context.business;

    format!(
        r#"Define the "{category}" workstream for {name}, a {kind} in the {industry} industry.

Business description: {description}
Category focus: {focus}
Share of total effort: {weight:.0}%
Priority: {priority}

Business analysis insights:
{insights}

Requirements:
- Be specific to a {kind} in {industry}. Generic project-management wording is not acceptable.
- name: a short, concrete workstream title.
- description: one or two sentences on what this workstream achieves.
- deliverables: {min} to {max} tangible outputs.
"#,
        category = category.category,
        name = business.name,
        kind = business.business_type,
        industry = business.industry_or_type(),
        description = business.description,
        focus = category.description.as_deref().unwrap_or(&category.category),
        weight = category.weight,
        priority = category.priority.as_str(),
        insights = render_insights(&input.insights),
        min = MIN_DELIVERABLES,
        max = MAX_DELIVERABLES,
    )
}

fn build_dependency_prompt(workstreams: &[WorkStream]) -> String {
    let listing: Vec<String> = workstreams
        .iter()
        .map(|ws| {
            format!(
                "- {} \"{}\" ({}): {}",
                ws.id,
                ws.name,
                ws.category,
                ws.deliverables.join("; ")
            )
        })
        .collect();

    format!(
        r#"Determine which workstreams must finish before others can start.

Workstreams:
{}

Heuristics:
- Legal and compliance work typically comes first.
- Physical infrastructure comes before operations.
- Hiring comes before operations.
- Technology and marketing can usually run in parallel.

Return one entry per workstream. dependsOn lists workstream ids from the list above; use an empty list when
a workstream can start immediately.
"#,
        listing.join("\n")
    )
}

#[async_trait]
impl PipelineStage for StreamOptimizer {
    type Input = OptimizerInput;
    type Output = Vec<WorkStream>;

    fn name(&self) -> &'static str {
        STAGE
    }

    async fn process(&self, input: &OptimizerInput) -> Result<Vec<WorkStream>, PipelineError> {
        let total = input.pattern.streams.len();
        let mut workstreams = Vec::with_capacity(total);

        for (index, category) in input.pattern.streams.iter().enumerate() {
            let ws = self.generate_stream(index, category, input).await?;
            debug!(id = %ws.id, name = %ws.name, category = %ws.category, "Workstream generated");

            if let Some(on_progress) = &input.on_progress {
                on_progress(index + 1, total, &ws.name);
            }
            workstreams.push(ws);
        }

        match self.link_dependencies(&workstreams).await {
            Ok(links) => apply_dependency_links(&mut workstreams, links),
            Err(e) => {
                warn!(error = %e, "Dependency linking failed, inferring sequential dependencies");
                self.context.report(ProgressEvent::DependencyFallback {
                    reason: e.to_string(),
                });
                infer_basic_dependencies(&mut workstreams);
            }
        }

        info!(
            stage = STAGE,
            workstreams = workstreams.len(),
            "Workstreams optimized"
        );
        Ok(workstreams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::output::{BusinessContext, BusinessScale, InitiativeType, Priority};
    use crate::pipeline::config::PipelineConfig;
    use std::sync::Mutex;
    use yare::parameterized;

    fn context() -> PlanningContext {
        PlanningContext::new(BusinessContext {
            name: "Bean There".to_string(),
            business_type: "coffee shop".to_string(),
            industry: Some("food & beverage".to_string()),
            scale: BusinessScale::Smb,
            description: "Specialty coffee".to_string(),
            keywords: None,
        })
    }

    fn pattern(categories: &[(&str, f64, Priority)]) -> WorkStreamPattern {
        WorkStreamPattern {
            initiative_type: InitiativeType::BusinessLaunch,
            streams: categories
                .iter()
                .map(|(c, w, p)| WorkStreamCategory::new(*c, *w, *p))
                .collect(),
            total_weight: Some(100.0),
        }
    }

    fn stream_response(name: &str, deliverables: usize) -> MockResponse {
        let deliverables: Vec<String> = (1..=deliverables)
            .map(|i| format!("{} output {}", name, i))
            .collect();
        MockResponse::json(json!({
            "name": name,
            "description": format!("{} for the coffee shop", name),
            "deliverables": deliverables
        }))
    }

    fn ws(id: &str, category: &str) -> WorkStream {
        WorkStream {
            id: id.to_string(),
            name: id.to_string(),
            category: category.to_string(),
            description: String::new(),
            proportional_effort: 10.0,
            priority: Priority::High,
            deliverables: vec![],
            dependencies: vec![],
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_ids_follow_pattern_order() {
        let client = Arc::new(MockLLMClient::new());
        for name in ["Lease", "Systems", "Hiring", "Launch"] {
            client.add_response(stream_response(name, 3));
        }
        client.add_response(MockResponse::json(json!({"dependencies": []})));

        let optimizer = StreamOptimizer::new(PipelineContext::new(client));
        let input = OptimizerInput::new(
            pattern(&[
                ("physical_infrastructure", 40.0, Priority::Critical),
                ("technology_systems", 20.0, Priority::Medium),
                ("human_resources", 20.0, Priority::High),
                ("marketing_sales", 20.0, Priority::Low),
            ]),
            context(),
            json!("insights"),
        );

        let workstreams = optimizer.process(&input).await.unwrap();
        let ids: Vec<&str> = workstreams.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["WS001", "WS002", "WS003", "WS004"]);
        assert_eq!(workstreams[0].name, "Lease");
        assert_eq!(workstreams[0].proportional_effort, 40.0);
        assert!((workstreams[0].confidence - 0.97).abs() < 1e-9);
        assert!(workstreams.iter().all(|w| w.dependencies.is_empty()));
    }

    #[tokio::test]
    async fn test_progress_callback_is_monotonic() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(stream_response("Permits", 3));
        client.add_response(stream_response("Fit-out", 4));
        client.add_response(MockResponse::json(json!({"dependencies": []})));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: StreamProgressCallback =
            Arc::new(move |current: usize, total: usize, name: &str| {
                sink.lock().unwrap().push((current, total, name.to_string()));
            });

        let input = OptimizerInput::new(
            pattern(&[
                ("legal_compliance", 50.0, Priority::High),
                ("physical_infrastructure", 50.0, Priority::Critical),
            ]),
            context(),
            json!(null),
        )
        .with_progress(callback);

        StreamOptimizer::new(PipelineContext::new(client))
            .process(&input)
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (1, 2, "Permits".to_string()),
                (2, 2, "Fit-out".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_dependency_links_use_fast_model() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(stream_response("Permits", 3));
        client.add_response(stream_response("Fit-out", 3));
        client.add_response(MockResponse::json(json!({
            "dependencies": [
                {"workstreamId": "WS002", "dependsOn": ["WS001", "WS002", "WS999"]}
            ]
        })));

        let context = PipelineContext::new(client.clone())
            .with_config(PipelineConfig::new().with_dependency_model("fast-model"));
        let input = OptimizerInput::new(
            pattern(&[
                ("legal_compliance", 50.0, Priority::High),
                ("physical_infrastructure", 50.0, Priority::Critical),
            ]),
            self::context(),
            json!(null),
        );

        let workstreams = StreamOptimizer::new(context).process(&input).await.unwrap();

        assert!(workstreams[0].dependencies.is_empty());
        assert_eq!(workstreams[1].dependencies, vec!["WS001".to_string()]);

        let models: Vec<String> = client.calls().into_iter().map(|c| c.model).collect();
        assert_eq!(models, vec!["mock-model", "mock-model", "fast-model"]);
    }

    #[tokio::test]
    async fn test_stream_generation_failure_propagates() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(stream_response("Permits", 3));
        client.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 30 }));
        client.add_response(MockResponse::json(json!({"dependencies": []})));

        let input = OptimizerInput::new(
            pattern(&[
                ("legal_compliance", 50.0, Priority::High),
                ("physical_infrastructure", 50.0, Priority::Critical),
            ]),
            context(),
            json!(null),
        );
        let err = StreamOptimizer::new(PipelineContext::new(client.clone()))
            .process(&input)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Llm {
                stage: "optimizer",
                source: BackendError::TimeoutError { seconds: 30 }
            }
        ));
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.remaining_responses(), 1);
    }

    #[tokio::test]
    async fn test_too_few_deliverables_is_an_error() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(stream_response("Permits", 2));

        let input = OptimizerInput::new(
            pattern(&[("legal_compliance", 100.0, Priority::High)]),
            context(),
            json!(null),
        );
        let err = StreamOptimizer::new(PipelineContext::new(client))
            .process(&input)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidOutput { stage: "optimizer", .. }));
    }

    #[test]
    fn test_deliverables_are_trimmed_and_capped() {
        let out = normalize_deliverables(
            ["a", " ", "b ", "c", "d", "e", "f"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        assert_eq!(out, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_infer_basic_dependencies_preserves_order() {
        let mut workstreams = vec![
            ws("WS001", "marketing_sales"),
            ws("WS002", "physical_infrastructure"),
            ws("WS003", "legal_compliance"),
            ws("WS004", "operations"),
        ];

        infer_basic_dependencies(&mut workstreams);

        let ids: Vec<&str> = workstreams.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["WS001", "WS002", "WS003", "WS004"]);
        assert_eq!(workstreams[2].dependencies, Vec::<String>::new());
        assert_eq!(workstreams[1].dependencies, vec!["WS003"]);
        assert_eq!(workstreams[3].dependencies, vec!["WS002"]);
        assert_eq!(workstreams[0].dependencies, vec!["WS004"]);
    }

    #[parameterized(
        unknown_sorts_last = { &["supply_chain", "legal_compliance"], &[&["WS002"], &[]] },
        ties_keep_input_order = { &["supply_chain", "financial_management"], &[&[], &["WS001"]] },
        single = { &["operations"], &[&[]] },
    )]
    fn test_fallback_ordering(categories: &[&str], expected: &[&[&str]]) {
        let mut workstreams: Vec<WorkStream> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| ws(&workstream_id(i), c))
            .collect();

        infer_basic_dependencies(&mut workstreams);

        for (ws, want) in workstreams.iter().zip(expected) {
            assert_eq!(ws.dependencies, want.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_apply_dependency_links_defaults_to_empty() {
        let mut workstreams = vec![ws("WS001", "operations"), ws("WS002", "marketing_sales")];
        workstreams[0].dependencies = vec!["stale".to_string()];

        apply_dependency_links(
            &mut workstreams,
            vec![DependencyLink {
                workstream_id: "WS002".to_string(),
                depends_on: vec!["WS001".to_string(), "WS001".to_string()],
            }],
        );

        assert!(workstreams[0].dependencies.is_empty());
        assert_eq!(workstreams[1].dependencies, vec!["WS001"]);
    }
}
