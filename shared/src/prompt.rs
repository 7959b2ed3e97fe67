//! System-prompt construction and prompt-mode prefixing.
//!
//! The system prompt is assembled in a fixed order from static guidance
//! paragraphs keyed by the sanitized context. Construction is pure and
//! deterministic so prompts can be golden-tested.

use std::path::Path;
use std::sync::OnceLock;

use crate::context::{
    ArtifactFormat, Cloud, FormatRequestContext, Goal, Profile, PromptMode, RequestContext,
};
use crate::{Error, Result};

/// Hard cutoff applied to each composed prompt, as a rough guard against
/// token limits. Character-based, not word-boundary aware.
pub const MAX_PROMPT_LEN: usize = 16000;

const OPTIMIZED_PREFIX: &str =
    "[OPTIMIZATION INSTRUCTIONS - Output should be minimal, performant, and cost-aware]";

/// Secure-mode instruction prefix, read once from disk and cached for the
/// lifetime of the process.
static SECURE_INSTRUCTIONS: OnceLock<String> = OnceLock::new();

/// Load the secure-mode instruction prefix from the given path. The first
/// successful read is cached; later calls return the cached content.
pub fn secure_instructions(path: &Path) -> Result<&'static str> {
    if let Some(cached) = SECURE_INSTRUCTIONS.get() {
        return Ok(cached.as_str());
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read secure instructions from {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(SECURE_INSTRUCTIONS.get_or_init(|| content).as_str())
}

/// Truncate a composed prompt to [`MAX_PROMPT_LEN`] characters.
pub fn truncate_prompt(prompt: String) -> String {
    if prompt.chars().count() <= MAX_PROMPT_LEN {
        return prompt;
    }
    prompt.chars().take(MAX_PROMPT_LEN).collect()
}

/// Prepend the mode-specific instruction block to a user prompt.
///
/// `standard` (and anything unrecognized upstream) leaves the prompt
/// untouched. The secure prefix is passed in by the caller so this stays a
/// pure function.
pub fn apply_prompt_mode_prefix(user_prompt: &str, mode: PromptMode, secure_prefix: &str) -> String {
    match mode {
        PromptMode::Secure => format!("{}\n\n{}", secure_prefix, user_prompt),
        PromptMode::Optimized => format!("{}\n\n{}", OPTIMIZED_PREFIX, user_prompt),
        PromptMode::Standard => user_prompt.to_string(),
    }
}

/// Build the final user-side prompt: mode prefix plus length cutoff.
pub fn build_user_prompt(user_prompt: &str, mode: PromptMode, secure_prefix: &str) -> String {
    truncate_prompt(apply_prompt_mode_prefix(user_prompt, mode, secure_prefix))
}

/// Build the system prompt for the cloud assistant.
///
/// Order is fixed: base policy, cloud guidance, goal guidance, profile
/// guidance.
pub fn build_cloud_system_prompt(ctx: &RequestContext) -> String {
    let base = format!(
        "You are a senior DevOps and cloud infrastructure assistant. \
         Produce working, production-ready {} output with short explanations \
         only where a decision needs justification. Never invent resource \
         names or credentials; mark anything the user must fill in.",
        ctx.output_format.as_str()
    );
    truncate_prompt(format!(
        "{}\n\n{}\n\n{}\n\n{}",
        base,
        cloud_guidance(ctx.cloud),
        goal_guidance(ctx.goal),
        profile_guidance(ctx.profile)
    ))
}

/// Build the system prompt for the format assistant.
///
/// Order is fixed: base policy, format guidance, profile guidance.
pub fn build_format_system_prompt(ctx: &FormatRequestContext) -> String {
    let base = "You are an infrastructure artifact generator. Respond with a JSON \
                object containing: summary (string), plan (array of steps), \
                artifacts (array of {type, filename, content} with complete \
                paste-ready file contents), validation (array of {label, status, \
                detail} checks the user should run), and notes (array of gotchas). \
                Every artifact must be a complete file, never a fragment. Apply \
                secure defaults: least privilege, no plaintext secrets, pinned \
                versions.";
    truncate_prompt(format!(
        "{}\n\n{}\n\n{}",
        base,
        format_guidance(ctx.format),
        profile_guidance(ctx.profile)
    ))
}

fn cloud_guidance(cloud: Cloud) -> &'static str {
    match cloud {
        Cloud::Aws => {
            "Target AWS. Prefer managed services (VPC, IAM, ECS/EKS, RDS, S3, \
             CloudWatch) and reference resources by Terraform AWS provider \
             names where applicable. Default region us-east-1 unless the user \
             says otherwise, and call out anything with cross-region impact."
        }
        Cloud::Azure => {
            "Target Microsoft Azure. Prefer resource groups, managed identities, \
             AKS, Azure Monitor, and Key Vault. Use Bicep or the azurerm \
             Terraform provider naming, and note subscription-scope operations \
             explicitly."
        }
        Cloud::Gcp => {
            "Target Google Cloud. Prefer projects, service accounts with minimal \
             roles, GKE, Cloud Monitoring, and Secret Manager. Use the google \
             Terraform provider naming and flag anything that requires \
             organization-level permissions."
        }
        Cloud::Unknown => {
            "No cloud provider was specified. Keep guidance provider-neutral, \
             note where AWS, Azure, and GCP diverge, and avoid provider-specific \
             resource names unless the user's prompt implies one."
        }
    }
}

fn goal_guidance(goal: Goal) -> &'static str {
    match goal {
        Goal::Build => {
            "The user is building something new. Start from a minimal working \
             baseline, name every resource consistently, and include the \
             commands to provision and verify it."
        }
        Goal::Migrate => {
            "The user is migrating an existing workload. Sequence the migration \
             into reversible steps, call out data-transfer and cutover risks, \
             and include a rollback path for each step."
        }
        Goal::Operate => {
            "The user is operating a running system. Favor diagnostics before \
             changes, include the observability queries or commands to confirm \
             a hypothesis, and keep changes small and reversible."
        }
        Goal::Secure => {
            "The user is hardening a system. Enumerate the attack surface \
             relevant to the prompt, apply least privilege, and list the \
             controls added with the threat each one addresses."
        }
        Goal::Unknown => {
            "The user's goal was not specified. Infer the most likely intent \
             from the prompt, state the assumption in one line, and proceed."
        }
    }
}

fn profile_guidance(profile: Profile) -> &'static str {
    match profile {
        Profile::Secure => {
            "Bias every choice toward security: least-privilege IAM, encryption \
             at rest and in transit, no inline secrets, deny-by-default network \
             rules. Flag any requested configuration that weakens this posture \
             instead of silently applying it."
        }
        Profile::Optimized => {
            "Bias every choice toward cost and performance: right-sized \
             instances, spot or preemptible capacity where safe, minimal \
             always-on footprint. State the monthly cost drivers of what you \
             propose."
        }
        Profile::Default => {
            "Balance security, cost, and simplicity. Prefer the boring, \
             well-documented option and mention one hardening and one \
             cost-reduction follow-up the user could apply later."
        }
    }
}

fn format_guidance(format: ArtifactFormat) -> &'static str {
    match format {
        ArtifactFormat::Terraform => {
            "Generate Terraform. Pin provider versions, declare variables with \
             descriptions and sane defaults, keep state assumptions explicit, \
             and include a terraform validate / plan checklist."
        }
        ArtifactFormat::Kubernetes => {
            "Generate Kubernetes manifests. Set resource requests and limits, \
             liveness and readiness probes, non-root securityContext, and \
             namespace every object. Validate with kubectl apply --dry-run."
        }
        ArtifactFormat::Helm => {
            "Generate a Helm chart. Keep values.yaml minimal with documented \
             keys, template every environment-specific value, and include \
             helm lint and helm template verification steps."
        }
        ArtifactFormat::GithubActions => {
            "Generate GitHub Actions workflows. Pin action versions by SHA, \
             scope permissions per job, use OIDC instead of long-lived cloud \
             keys, and cache dependencies where it pays off."
        }
        ArtifactFormat::GitlabCi => {
            "Generate GitLab CI configuration. Use explicit stages, rules \
             instead of only/except, masked CI variables for secrets, and \
             needs: to shorten the critical path."
        }
        ArtifactFormat::Docker => {
            "Generate Dockerfiles. Use multi-stage builds, pinned base image \
             digests, a non-root runtime user, and a .dockerignore. Include \
             the build and local-run commands."
        }
        ArtifactFormat::Ansible => {
            "Generate Ansible playbooks. Keep tasks idempotent, name every \
             task, use handlers for restarts and ansible-vault for secrets, \
             and include a --check mode verification step."
        }
        ArtifactFormat::Observability => {
            "Generate observability configuration (dashboards, alerts, \
             scrape configs). Alert on symptoms rather than causes, include \
             runbook links in annotations, and avoid unbounded-cardinality \
             labels."
        }
        ArtifactFormat::Policy => {
            "Generate policy-as-code (Rego or similar). Write deny rules with \
             clear messages, cover the allow path with tests, and keep each \
             policy scoped to one concern."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OutputFormat;

    fn cloud_ctx() -> RequestContext {
        RequestContext {
            cloud: Cloud::Aws,
            goal: Goal::Build,
            output_format: OutputFormat::Terraform,
            profile: Profile::Secure,
        }
    }

    #[test]
    fn test_cloud_prompt_layers_in_order() {
        let prompt = build_cloud_system_prompt(&cloud_ctx());
        let cloud_pos = prompt.find("Target AWS").unwrap();
        let goal_pos = prompt.find("building something new").unwrap();
        let profile_pos = prompt.find("least-privilege IAM").unwrap();
        assert!(prompt.contains("terraform output"));
        assert!(cloud_pos < goal_pos && goal_pos < profile_pos);
    }

    #[test]
    fn test_cloud_prompt_is_deterministic() {
        let ctx = cloud_ctx();
        assert_eq!(build_cloud_system_prompt(&ctx), build_cloud_system_prompt(&ctx));
    }

    #[test]
    fn test_every_enum_value_has_guidance() {
        for cloud in [Cloud::Aws, Cloud::Azure, Cloud::Gcp, Cloud::Unknown] {
            assert!(!cloud_guidance(cloud).is_empty());
        }
        for goal in [Goal::Build, Goal::Migrate, Goal::Operate, Goal::Secure, Goal::Unknown] {
            assert!(!goal_guidance(goal).is_empty());
        }
        for profile in [Profile::Secure, Profile::Optimized, Profile::Default] {
            assert!(!profile_guidance(profile).is_empty());
        }
        for format in [
            ArtifactFormat::Terraform,
            ArtifactFormat::Kubernetes,
            ArtifactFormat::Helm,
            ArtifactFormat::GithubActions,
            ArtifactFormat::GitlabCi,
            ArtifactFormat::Docker,
            ArtifactFormat::Ansible,
            ArtifactFormat::Observability,
            ArtifactFormat::Policy,
        ] {
            assert!(!format_guidance(format).is_empty());
        }
    }

    #[test]
    fn test_secure_mode_overrides_requested_profile() {
        // profile:"optimized" in the context loses to promptMode:"secure"
        let profile = Profile::resolve(PromptMode::Secure, Some("optimized"));
        let ctx = RequestContext { profile, ..cloud_ctx() };
        let prompt = build_cloud_system_prompt(&ctx);
        assert!(prompt.contains("least-privilege IAM"));
        assert!(!prompt.contains("monthly cost drivers"));
    }

    #[test]
    fn test_standard_mode_leaves_prompt_unchanged() {
        let prompt = "deploy a three-tier app";
        assert_eq!(
            apply_prompt_mode_prefix(prompt, PromptMode::Standard, "ignored"),
            prompt
        );
    }

    #[test]
    fn test_secure_mode_prepends_prefix_with_blank_line() {
        let combined = apply_prompt_mode_prefix("make a vpc", PromptMode::Secure, "BE CAREFUL");
        assert_eq!(combined, "BE CAREFUL\n\nmake a vpc");
    }

    #[test]
    fn test_optimized_mode_prepends_directive() {
        let combined = apply_prompt_mode_prefix("make a vpc", PromptMode::Optimized, "");
        assert!(combined.starts_with("[OPTIMIZATION INSTRUCTIONS"));
        assert!(combined.ends_with("\n\nmake a vpc"));
    }

    #[test]
    fn test_truncation_boundary() {
        let long = "x".repeat(MAX_PROMPT_LEN + 500);
        let truncated = build_user_prompt(&long, PromptMode::Standard, "");
        assert_eq!(truncated.chars().count(), MAX_PROMPT_LEN);

        let exact = "y".repeat(MAX_PROMPT_LEN);
        assert_eq!(build_user_prompt(&exact, PromptMode::Standard, ""), exact);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "é".repeat(MAX_PROMPT_LEN + 1);
        let truncated = truncate_prompt(long);
        assert_eq!(truncated.chars().count(), MAX_PROMPT_LEN);
    }
}
