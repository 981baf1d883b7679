//! Translation of a pipeline into a linear workflow DAG.

use super::model::{
    API_VERSION, Arguments, Artifact, Dag, KIND, Parameter, Task, TaskArguments, Template,
    TemplateRef, Workflow, WorkflowMetadata, WorkflowSpec,
};
use super::name::WorkflowName;
use crate::PipelineConfig;

const PARAM_BASE_URL: &str = "base-url";
const PARAM_RECORD_ID: &str = "record-id";
const PARAM_SECRET_KEY: &str = "secret-key";
const PARAM_FILE_IDS: &str = "file-ids";
const PARAM_WORKFLOW_NAME: &str = "workflow-name";
const PARAM_TASK_DISCRIMINATOR: &str = "task-discriminator";

/// Builds the submission payload for one run of a pipeline.
///
/// The graph is always
/// `read → (step_i → write_i)* → revoke`: every processing step depends on
/// the read task alone, each write task on its processing step, and the
/// revoke task on every write task (or on the read task when the pipeline
/// has no steps). Building never fails and is deterministic: equal inputs
/// produce equal payloads.
///
/// ```
/// use filepipe_argo::{PipelineConfig, ProcessingStep, WorkflowGraphBuilder};
///
/// let pipeline = PipelineConfig::new("count-words", "text/plain")
///     .with_step(ProcessingStep::new("count-words-template", "count-words"));
///
/// let workflow = WorkflowGraphBuilder::new(&pipeline, "https://files.internal/api")
///     .record("ab12-xy34", 3)
///     .files(["notes.txt"])
///     .build();
///
/// assert_eq!(workflow.name(), "count-words-ab12-xy34-3");
/// assert_eq!(workflow.tasks().len(), 4);
/// ```
#[derive(Debug, Clone)]
#[must_use = "builders do nothing unless built"]
pub struct WorkflowGraphBuilder<'a> {
    pipeline: &'a PipelineConfig,
    base_url: String,
    record_id: String,
    sequence_id: u64,
    file_keys: Vec<String>,
    secret_key: Option<String>,
}

impl<'a> WorkflowGraphBuilder<'a> {
    /// Starts a graph for `pipeline`, whose tasks call back into `base_url`.
    pub fn new(pipeline: &'a PipelineConfig, base_url: impl Into<String>) -> Self {
        Self {
            pipeline,
            base_url: base_url.into(),
            record_id: String::new(),
            sequence_id: 0,
            file_keys: Vec::new(),
            secret_key: None,
        }
    }

    /// Sets the record and its allocated sequence number.
    pub fn record(mut self, record_id: impl Into<String>, sequence_id: u64) -> Self {
        self.record_id = record_id.into();
        self.sequence_id = sequence_id;
        self
    }

    /// Sets the input file keys, in submission order.
    pub fn files<I, S>(mut self, file_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_keys = file_keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-submission token the read task authenticates with and
    /// the revoke task invalidates.
    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Returns the canonical name of the workflow being built.
    pub fn workflow_name(&self) -> WorkflowName {
        WorkflowName::new(&self.pipeline.name, &self.record_id, self.sequence_id)
    }

    /// Builds the workflow resource.
    pub fn build(&self) -> Workflow {
        let full_name = self.workflow_name().to_string();
        let tasks = self.tasks(&full_name);

        Workflow {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata: WorkflowMetadata {
                name: full_name.clone(),
            },
            spec: WorkflowSpec {
                entrypoint: full_name.clone(),
                arguments: Arguments {
                    parameters: self.workflow_parameters(),
                },
                templates: vec![Template {
                    name: full_name,
                    dag: Dag { tasks },
                }],
            },
        }
    }

    fn workflow_parameters(&self) -> Vec<Parameter> {
        let mut parameters = vec![
            Parameter::new(PARAM_BASE_URL, &self.base_url),
            Parameter::new(PARAM_RECORD_ID, &self.record_id),
        ];
        if let Some(secret_key) = &self.secret_key {
            parameters.push(Parameter::new(PARAM_SECRET_KEY, secret_key));
        }
        parameters.push(Parameter::new(PARAM_FILE_IDS, self.file_keys.join(" ")));
        parameters
    }

    fn tasks(&self, full_name: &str) -> Vec<Task> {
        let read = self.read_task();
        let read_name = read.name.clone();

        let mut tasks = Vec::with_capacity(2 + 2 * self.pipeline.steps.len());
        let mut write_names = Vec::with_capacity(self.pipeline.steps.len());
        tasks.push(read);

        for step in &self.pipeline.steps {
            let processing = Task {
                name: self.task_name(&step.template),
                dependencies: vec![read_name.clone()],
                template_ref: TemplateRef::new(&step.name, &step.template),
                arguments: TaskArguments {
                    parameters: Vec::new(),
                    artifacts: vec![Artifact::input_files_from(&read_name)],
                },
            };

            let write = Task {
                name: self.task_name(&format!("write-files-{}", step.template)),
                dependencies: vec![processing.name.clone()],
                template_ref: TemplateRef::new("write-files-template", "write-files"),
                arguments: TaskArguments {
                    parameters: vec![
                        Parameter::forwarded(PARAM_BASE_URL),
                        Parameter::forwarded(PARAM_RECORD_ID),
                        Parameter::new(PARAM_WORKFLOW_NAME, full_name),
                        Parameter::new(PARAM_TASK_DISCRIMINATOR, &step.template),
                    ],
                    artifacts: vec![Artifact::input_files_from(&processing.name)],
                },
            };

            write_names.push(write.name.clone());
            tasks.push(processing);
            tasks.push(write);
        }

        if write_names.is_empty() {
            write_names.push(read_name);
        }
        tasks.push(self.revoke_task(full_name, write_names));

        tasks
    }

    fn read_task(&self) -> Task {
        let mut parameters = vec![
            Parameter::forwarded(PARAM_BASE_URL),
            Parameter::forwarded(PARAM_RECORD_ID),
        ];
        if self.secret_key.is_some() {
            parameters.push(Parameter::forwarded(PARAM_SECRET_KEY));
        }
        parameters.push(Parameter::forwarded(PARAM_FILE_IDS));

        Task {
            name: self.task_name("read-files"),
            dependencies: Vec::new(),
            template_ref: TemplateRef::new("read-files-template", "read-files"),
            arguments: TaskArguments {
                parameters,
                artifacts: Vec::new(),
            },
        }
    }

    fn revoke_task(&self, full_name: &str, dependencies: Vec<String>) -> Task {
        let mut parameters = vec![
            Parameter::forwarded(PARAM_BASE_URL),
            Parameter::new(PARAM_WORKFLOW_NAME, full_name),
        ];
        if self.secret_key.is_some() {
            parameters.push(Parameter::forwarded(PARAM_SECRET_KEY));
        }

        Task {
            name: self.task_name("delete-token"),
            dependencies,
            template_ref: TemplateRef::new("delete-token-template", "delete-token"),
            arguments: TaskArguments {
                parameters,
                artifacts: Vec::new(),
            },
        }
    }

    /// `{prefix}-{record_id}-{sequence_id}`
    fn task_name(&self, prefix: &str) -> String {
        format!("{}-{}-{}", prefix, self.record_id, self.sequence_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ProcessingStep;

    const BASE_URL: &str = "https://host-service.argo.svc.cluster.local:5000/api/experiments";

    fn pipeline(templates: &[&str]) -> PipelineConfig {
        templates.iter().fold(
            PipelineConfig::new("read-count-write", "text/plain"),
            |pipeline, template| {
                pipeline.with_step(ProcessingStep::new(format!("{template}-template"), *template))
            },
        )
    }

    fn build(pipeline: &PipelineConfig) -> Workflow {
        WorkflowGraphBuilder::new(pipeline, BASE_URL)
            .record("12345", 2)
            .files(["test.txt", "test1.txt"])
            .secret_key("s3cr3t")
            .build()
    }

    #[test]
    fn task_count_is_two_plus_twice_the_steps() {
        for steps in 0..5 {
            let templates: Vec<String> = (0..steps).map(|i| format!("step{i}")).collect();
            let templates: Vec<&str> = templates.iter().map(String::as_str).collect();
            let workflow = build(&pipeline(&templates));
            assert_eq!(workflow.tasks().len(), 2 + 2 * steps);
        }
    }

    #[test]
    fn revoke_depends_on_every_write() {
        let workflow = build(&pipeline(&["count-words", "count-words-advanced"]));
        let revoke = workflow.tasks().last().unwrap();

        assert_eq!(revoke.name, "delete-token-12345-2");
        assert_eq!(
            revoke.dependencies,
            [
                "write-files-count-words-12345-2",
                "write-files-count-words-advanced-12345-2",
            ]
        );
    }

    #[test]
    fn zero_steps_is_read_then_revoke() {
        let workflow = build(&pipeline(&[]));
        let names: Vec<&str> = workflow.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["read-files-12345-2", "delete-token-12345-2"]);
        assert_eq!(workflow.tasks()[1].dependencies, ["read-files-12345-2"]);
    }

    #[test]
    fn steps_depend_on_read_only() {
        let workflow = build(&pipeline(&["a", "b", "c"]));
        let tasks = workflow.tasks();

        // read, then (step, write) pairs, then revoke
        for pair in tasks[1..tasks.len() - 1].chunks(2) {
            let (step, write) = (&pair[0], &pair[1]);
            assert_eq!(step.dependencies, ["read-files-12345-2"], "{}", step.name);
            assert_eq!(write.dependencies, [step.name.clone()]);
        }
    }

    #[test]
    fn build_is_deterministic() -> anyhow::Result<()> {
        let pipeline = pipeline(&["count-words", "count-words-advanced"]);
        let first = serde_json::to_vec(&build(&pipeline))?;
        let second = serde_json::to_vec(&build(&pipeline))?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn without_secret_omits_secret_parameters() {
        let pipeline = pipeline(&["count-words"]);
        let workflow = WorkflowGraphBuilder::new(&pipeline, BASE_URL)
            .record("12345", 2)
            .build();

        let has_secret = |params: &[Parameter]| params.iter().any(|p| p.name == "secret-key");
        assert!(!has_secret(&workflow.spec.arguments.parameters));
        assert!(
            workflow
                .tasks()
                .iter()
                .all(|task| !has_secret(&task.arguments.parameters))
        );
    }

    #[test]
    fn payload_matches_wire_format() -> anyhow::Result<()> {
        let workflow = build(&pipeline(&["count-words"]));
        let actual = serde_json::to_value(&workflow)?;

        let expected = json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Workflow",
            "metadata": { "name": "read-count-write-12345-2" },
            "spec": {
                "entrypoint": "read-count-write-12345-2",
                "arguments": {
                    "parameters": [
                        { "name": "base-url", "value": BASE_URL },
                        { "name": "record-id", "value": "12345" },
                        { "name": "secret-key", "value": "s3cr3t" },
                        { "name": "file-ids", "value": "test.txt test1.txt" }
                    ]
                },
                "templates": [{
                    "name": "read-count-write-12345-2",
                    "dag": { "tasks": [
                        {
                            "name": "read-files-12345-2",
                            "dependencies": [],
                            "templateRef": { "name": "read-files-template", "template": "read-files" },
                            "arguments": {
                                "parameters": [
                                    { "name": "base-url", "value": "{{workflow.parameters.base-url}}" },
                                    { "name": "record-id", "value": "{{workflow.parameters.record-id}}" },
                                    { "name": "secret-key", "value": "{{workflow.parameters.secret-key}}" },
                                    { "name": "file-ids", "value": "{{workflow.parameters.file-ids}}" }
                                ],
                                "artifacts": []
                            }
                        },
                        {
                            "name": "count-words-12345-2",
                            "dependencies": ["read-files-12345-2"],
                            "templateRef": { "name": "count-words-template", "template": "count-words" },
                            "arguments": {
                                "parameters": [],
                                "artifacts": [{
                                    "name": "input-files",
                                    "from": "{{tasks.read-files-12345-2.outputs.artifacts.output-files}}"
                                }]
                            }
                        },
                        {
                            "name": "write-files-count-words-12345-2",
                            "dependencies": ["count-words-12345-2"],
                            "templateRef": { "name": "write-files-template", "template": "write-files" },
                            "arguments": {
                                "parameters": [
                                    { "name": "base-url", "value": "{{workflow.parameters.base-url}}" },
                                    { "name": "record-id", "value": "{{workflow.parameters.record-id}}" },
                                    { "name": "workflow-name", "value": "read-count-write-12345-2" },
                                    { "name": "task-discriminator", "value": "count-words" }
                                ],
                                "artifacts": [{
                                    "name": "input-files",
                                    "from": "{{tasks.count-words-12345-2.outputs.artifacts.output-files}}"
                                }]
                            }
                        },
                        {
                            "name": "delete-token-12345-2",
                            "dependencies": ["write-files-count-words-12345-2"],
                            "templateRef": { "name": "delete-token-template", "template": "delete-token" },
                            "arguments": {
                                "parameters": [
                                    { "name": "base-url", "value": "{{workflow.parameters.base-url}}" },
                                    { "name": "workflow-name", "value": "read-count-write-12345-2" },
                                    { "name": "secret-key", "value": "{{workflow.parameters.secret-key}}" }
                                ],
                                "artifacts": []
                            }
                        }
                    ]}
                }]
            }
        });

        assert_eq!(actual, expected);
        Ok(())
    }
}
