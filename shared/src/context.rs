//! Request-context sanitization.
//!
//! Every field arriving from the client is an untrusted string. Each one is
//! resolved against a fixed allowlist; absent or unmapped values collapse to
//! a documented default. Sanitization is total and never fails.

use serde::{Deserialize, Serialize};

/// Cloud provider the cloud assistant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cloud {
    Aws,
    Azure,
    Gcp,
    Unknown,
}

impl Cloud {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("aws") => Cloud::Aws,
            Some("azure") => Cloud::Azure,
            Some("gcp") => Cloud::Gcp,
            _ => Cloud::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cloud::Aws => "aws",
            Cloud::Azure => "azure",
            Cloud::Gcp => "gcp",
            Cloud::Unknown => "unknown",
        }
    }
}

/// What the user is trying to accomplish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Build,
    Migrate,
    Operate,
    Secure,
    Unknown,
}

impl Goal {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("build") => Goal::Build,
            Some("migrate") => Goal::Migrate,
            Some("operate") => Goal::Operate,
            Some("secure") => Goal::Secure,
            Some("unknown") => Goal::Unknown,
            _ => Goal::Build,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Build => "build",
            Goal::Migrate => "migrate",
            Goal::Operate => "operate",
            Goal::Secure => "secure",
            Goal::Unknown => "unknown",
        }
    }
}

/// Requested shape of the generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Terraform,
    Yaml,
    Bicep,
    Cli,
    Runbook,
    Rego,
    Ci,
    Dockerfile,
    Compose,
    Unknown,
}

impl OutputFormat {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("terraform") => OutputFormat::Terraform,
            Some("yaml") => OutputFormat::Yaml,
            Some("bicep") => OutputFormat::Bicep,
            Some("cli") => OutputFormat::Cli,
            Some("runbook") => OutputFormat::Runbook,
            Some("rego") => OutputFormat::Rego,
            Some("ci") => OutputFormat::Ci,
            Some("dockerfile") => OutputFormat::Dockerfile,
            Some("compose") => OutputFormat::Compose,
            Some("unknown") => OutputFormat::Unknown,
            _ => OutputFormat::Terraform,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Terraform => "terraform",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Bicep => "bicep",
            OutputFormat::Cli => "cli",
            OutputFormat::Runbook => "runbook",
            OutputFormat::Rego => "rego",
            OutputFormat::Ci => "ci",
            OutputFormat::Dockerfile => "dockerfile",
            OutputFormat::Compose => "compose",
            OutputFormat::Unknown => "unknown",
        }
    }
}

/// Response-tone lever. Independent from prompt mode but influenced by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Secure,
    Optimized,
    Default,
}

impl Profile {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("secure") => Profile::Secure,
            Some("optimized") => Profile::Optimized,
            Some("default") => Profile::Default,
            _ => Profile::Secure,
        }
    }

    /// Resolve the effective profile. Prompt mode wins over whatever the
    /// client put in the context: secure mode forces a secure profile,
    /// optimized mode forces an optimized one.
    pub fn resolve(mode: PromptMode, requested: Option<&str>) -> Self {
        match mode {
            PromptMode::Secure => Profile::Secure,
            PromptMode::Optimized => Profile::Optimized,
            PromptMode::Standard => Profile::from_input(requested),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Secure => "secure",
            Profile::Optimized => "optimized",
            Profile::Default => "default",
        }
    }
}

/// Artifact family handled by the format assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Terraform,
    Kubernetes,
    Helm,
    #[serde(rename = "github-actions")]
    GithubActions,
    #[serde(rename = "gitlab-ci")]
    GitlabCi,
    Docker,
    Ansible,
    Observability,
    Policy,
}

impl ArtifactFormat {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("terraform") => ArtifactFormat::Terraform,
            Some("kubernetes") => ArtifactFormat::Kubernetes,
            Some("helm") => ArtifactFormat::Helm,
            Some("github-actions") => ArtifactFormat::GithubActions,
            Some("gitlab-ci") => ArtifactFormat::GitlabCi,
            Some("docker") => ArtifactFormat::Docker,
            Some("ansible") => ArtifactFormat::Ansible,
            Some("observability") => ArtifactFormat::Observability,
            Some("policy") => ArtifactFormat::Policy,
            _ => ArtifactFormat::Terraform,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFormat::Terraform => "terraform",
            ArtifactFormat::Kubernetes => "kubernetes",
            ArtifactFormat::Helm => "helm",
            ArtifactFormat::GithubActions => "github-actions",
            ArtifactFormat::GitlabCi => "gitlab-ci",
            ArtifactFormat::Docker => "docker",
            ArtifactFormat::Ansible => "ansible",
            ArtifactFormat::Observability => "observability",
            ArtifactFormat::Policy => "policy",
        }
    }
}

/// End-user-selected generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Secure,
    Optimized,
    Standard,
}

impl PromptMode {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("secure") => PromptMode::Secure,
            Some("optimized") => PromptMode::Optimized,
            _ => PromptMode::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Secure => "secure",
            PromptMode::Optimized => "optimized",
            PromptMode::Standard => "standard",
        }
    }
}

/// Which product mode handles the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantType {
    Cloud,
    Format,
}

impl AssistantType {
    pub fn from_input(value: Option<&str>) -> Self {
        match normalize(value).as_deref() {
            Some("format") => AssistantType::Format,
            _ => AssistantType::Cloud,
        }
    }
}

/// Raw, untyped context bag as it arrives from the client.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContext {
    pub cloud: Option<String>,
    pub goal: Option<String>,
    pub output_format: Option<String>,
    pub profile: Option<String>,
    pub format: Option<String>,
}

/// Fully-sanitized context for the cloud assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub cloud: Cloud,
    pub goal: Goal,
    pub output_format: OutputFormat,
    pub profile: Profile,
}

/// Fully-sanitized context for the format assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRequestContext {
    pub format: ArtifactFormat,
    pub output_format: OutputFormat,
    pub profile: Profile,
}

/// Sanitized context of either assistant, as echoed back to the caller.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum SanitizedContext {
    Cloud(RequestContext),
    Format(FormatRequestContext),
}

/// Sanitize a raw context bag for the cloud assistant.
pub fn sanitize_context(raw: &RawContext, mode: PromptMode) -> RequestContext {
    RequestContext {
        cloud: Cloud::from_input(raw.cloud.as_deref()),
        goal: Goal::from_input(raw.goal.as_deref()),
        output_format: OutputFormat::from_input(raw.output_format.as_deref()),
        profile: Profile::resolve(mode, raw.profile.as_deref()),
    }
}

/// Sanitize a raw context bag for the format assistant.
pub fn sanitize_format_context(raw: &RawContext, mode: PromptMode) -> FormatRequestContext {
    FormatRequestContext {
        format: ArtifactFormat::from_input(raw.format.as_deref()),
        output_format: OutputFormat::from_input(raw.output_format.as_deref()),
        profile: Profile::resolve(mode, raw.profile.as_deref()),
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_allowlist() {
        assert_eq!(Cloud::from_input(Some("aws")), Cloud::Aws);
        assert_eq!(Cloud::from_input(Some("AWS")), Cloud::Aws);
        assert_eq!(Cloud::from_input(Some("  Azure ")), Cloud::Azure);
        assert_eq!(Cloud::from_input(Some("digitalocean")), Cloud::Unknown);
        assert_eq!(Cloud::from_input(None), Cloud::Unknown);
        assert_eq!(Cloud::from_input(Some("")), Cloud::Unknown);
    }

    #[test]
    fn test_defaults_are_safe() {
        assert_eq!(Goal::from_input(Some("world domination")), Goal::Build);
        assert_eq!(OutputFormat::from_input(None), OutputFormat::Terraform);
        assert_eq!(Profile::from_input(Some("yolo")), Profile::Secure);
        assert_eq!(ArtifactFormat::from_input(Some("cobol")), ArtifactFormat::Terraform);
        assert_eq!(PromptMode::from_input(Some("turbo")), PromptMode::Standard);
    }

    #[test]
    fn test_sanitize_is_total() {
        let raw = RawContext {
            cloud: Some("<script>alert(1)</script>".to_string()),
            goal: Some("DROP TABLE".to_string()),
            output_format: Some("exe".to_string()),
            profile: Some("root".to_string()),
            format: Some("punchcards".to_string()),
        };
        let ctx = sanitize_context(&raw, PromptMode::Standard);
        assert_eq!(ctx.cloud, Cloud::Unknown);
        assert_eq!(ctx.goal, Goal::Build);
        assert_eq!(ctx.output_format, OutputFormat::Terraform);
        assert_eq!(ctx.profile, Profile::Secure);

        let fmt = sanitize_format_context(&raw, PromptMode::Standard);
        assert_eq!(fmt.format, ArtifactFormat::Terraform);
    }

    #[test]
    fn test_prompt_mode_forces_profile() {
        assert_eq!(
            Profile::resolve(PromptMode::Secure, Some("optimized")),
            Profile::Secure
        );
        assert_eq!(
            Profile::resolve(PromptMode::Optimized, Some("secure")),
            Profile::Optimized
        );
        assert_eq!(
            Profile::resolve(PromptMode::Standard, Some("optimized")),
            Profile::Optimized
        );
        assert_eq!(Profile::resolve(PromptMode::Standard, None), Profile::Secure);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&ArtifactFormat::GithubActions).unwrap();
        assert_eq!(json, r#""github-actions""#);
        let json = serde_json::to_string(&ArtifactFormat::GitlabCi).unwrap();
        assert_eq!(json, r#""gitlab-ci""#);
        let json = serde_json::to_string(&Cloud::Gcp).unwrap();
        assert_eq!(json, r#""gcp""#);
    }
}
