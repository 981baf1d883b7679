//! Submission payload for the Argo Workflows API.
//!
//! Field names and nesting follow the `argoproj.io/v1alpha1` `Workflow`
//! resource; only the parts a linear DAG needs are modelled.

use serde::{Deserialize, Serialize};

/// API version of the submitted resource.
pub const API_VERSION: &str = "argoproj.io/v1alpha1";

/// Kind of the submitted resource.
pub const KIND: &str = "Workflow";

/// A complete `Workflow` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub api_version: String,
    pub kind: String,
    pub metadata: WorkflowMetadata,
    pub spec: WorkflowSpec,
}

impl Workflow {
    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns every task of the entrypoint template, in emission order.
    pub fn tasks(&self) -> &[Task] {
        self.spec
            .templates
            .first()
            .map(|template| template.dag.tasks.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Name of the template the engine starts with.
    pub entrypoint: String,
    /// Workflow-level parameters referenced by tasks as `{{workflow.parameters.<name>}}`.
    pub arguments: Arguments,
    pub templates: Vec<Template>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    pub parameters: Vec<Parameter>,
}

/// A named template holding a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub dag: Dag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dag {
    pub tasks: Vec<Task>,
}

/// One node of the DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    /// Names of the tasks that must finish first.
    pub dependencies: Vec<String>,
    pub template_ref: TemplateRef,
    pub arguments: TaskArguments,
}

/// Reference to a template inside a `WorkflowTemplate` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    /// Name of the `WorkflowTemplate` resource.
    pub name: String,
    /// Template inside that resource.
    pub template: String,
}

impl TemplateRef {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskArguments {
    pub parameters: Vec<Parameter>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A parameter forwarding the workflow-level parameter of the same name.
    pub fn forwarded(name: &str) -> Self {
        Self::new(name, format!("{{{{workflow.parameters.{name}}}}}"))
    }
}

/// An input artifact taken from another task's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    /// Expression resolved by the engine, e.g. `{{tasks.<task>.outputs.artifacts.output-files}}`.
    pub from: String,
}

impl Artifact {
    /// The `input-files` artifact wired to `task`'s `output-files`.
    pub fn input_files_from(task: &str) -> Self {
        Self {
            name: "input-files".to_owned(),
            from: format!("{{{{tasks.{task}.outputs.artifacts.output-files}}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_parameter_expression() {
        let parameter = Parameter::forwarded("record-id");
        assert_eq!(parameter.value, "{{workflow.parameters.record-id}}");
    }

    #[test]
    fn artifact_expression() {
        let artifact = Artifact::input_files_from("read-files-ab12-1");
        assert_eq!(artifact.name, "input-files");
        assert_eq!(
            artifact.from,
            "{{tasks.read-files-ab12-1.outputs.artifacts.output-files}}"
        );
    }

    #[test]
    fn task_uses_camel_case() -> anyhow::Result<()> {
        let task = Task {
            name: "t".into(),
            dependencies: vec![],
            template_ref: TemplateRef::new("a", "b"),
            arguments: TaskArguments::default(),
        };
        let json = serde_json::to_value(&task)?;
        assert_eq!(json["templateRef"]["template"], "b");
        assert_eq!(json["dependencies"], serde_json::json!([]));
        assert_eq!(json["arguments"]["artifacts"], serde_json::json!([]));
        Ok(())
    }
}
