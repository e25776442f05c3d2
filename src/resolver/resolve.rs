//! Toolchain resolution: matching, ranking and fallback.

use serde::Serialize;

use crate::core::candidate::Candidate;
use crate::core::catalog::Locator;
use crate::resolver::constraint::Constraint;
use crate::util::context::PlanningContext;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Outcome of resolving one constraint against one locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// A candidate satisfied the constraint
    Selected(Candidate),
    /// Nothing matched; a default or placeholder stands in
    Fallback(Fallback),
}

/// Stand-in chosen when no candidate satisfies a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    /// The locator default, or the inert placeholder
    pub candidate: Candidate,
    /// Every distinct version the locator offered, for humans
    pub summary: String,
}

/// Cached per (locator, constraint): what the fallback resolved to.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub default: Option<Candidate>,
    pub summary: String,
}

impl Resolution {
    /// The candidate to build with, whichever way it was chosen.
    pub fn candidate(&self) -> &Candidate {
        match self {
            Resolution::Selected(candidate) => candidate,
            Resolution::Fallback(fallback) => &fallback.candidate,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// Pick the preferred candidate satisfying `constraint`.
///
/// Ranking: local before downloadable, then toolset version descending,
/// then secondary version descending. The sort is stable, so remaining ties
/// keep catalog enumeration order.
pub fn select<'a>(candidates: &'a [Candidate], constraint: &Constraint) -> Option<&'a Candidate> {
    let mut matching: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| constraint.matches(c))
        .collect();

    matching.sort_by(|a, b| {
        a.origin
            .cmp(&b.origin)
            .then_with(|| b.version.cmp(&a.version))
            .then_with(|| b.secondary.cmp(&a.secondary))
    });

    matching.into_iter().next()
}

/// Resolve a constraint against a locator.
///
/// An empty match is not an error: the locator default (or the placeholder)
/// is returned and a warning listing the available versions is reported
/// once per (locator, constraint) for the whole planning run.
pub fn resolve(ctx: &PlanningContext, locator: &dyn Locator, constraint: &Constraint) -> Resolution {
    if let Some(candidate) = select(locator.all(), constraint) {
        tracing::debug!(
            "{}: selected {} for {}",
            locator.identity(),
            candidate,
            constraint
        );
        return Resolution::Selected(candidate.clone());
    }

    let key = (locator.identity().to_string(), constraint.clone());
    let outcome = ctx.fallback_once(key, || {
        let default = locator.user_default().cloned();
        let summary = available_versions(locator);
        ctx.report(fallback_diagnostic(
            locator,
            constraint,
            default.as_ref(),
            &summary,
        ));
        FallbackOutcome { default, summary }
    });

    Resolution::Fallback(Fallback {
        candidate: outcome.default.unwrap_or_else(|| locator.placeholder()),
        summary: outcome.summary,
    })
}

/// Resolve to the locator default when one is configured, else the most
/// preferred candidate of any version.
pub fn resolve_default_or_latest(ctx: &PlanningContext, locator: &dyn Locator) -> Resolution {
    match locator.user_default() {
        Some(default) => {
            tracing::debug!("{}: using default {}", locator.identity(), default);
            Resolution::Selected(default.clone())
        }
        None => resolve(ctx, locator, &Constraint::any()),
    }
}

/// List every distinct toolset and SDK version a locator offers.
fn available_versions(locator: &dyn Locator) -> String {
    let candidates: Vec<&Candidate> = locator.all().iter().filter(|c| !c.placeholder).collect();

    let mut toolsets: Vec<String> = Vec::new();
    let mut sdks: Vec<String> = Vec::new();
    for candidate in &candidates {
        let toolset = format!("{} ({})", candidate.version, candidate.origin.tag());
        if !toolsets.contains(&toolset) {
            toolsets.push(toolset);
        }
        if let Some(secondary) = candidate.secondary {
            let sdk = format!("{} ({})", secondary, candidate.origin.tag());
            if !sdks.contains(&sdk) {
                sdks.push(sdk);
            }
        }
    }

    let list = |entries: &[String]| {
        if entries.is_empty() {
            "\t(none)".to_string()
        } else {
            entries
                .iter()
                .map(|e| format!("\t{}", e))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    format!(
        "the following toolset versions are available:\n{}\nand the following SDK versions are available:\n{}",
        list(&toolsets),
        list(&sdks)
    )
}

fn fallback_diagnostic(
    locator: &dyn Locator,
    constraint: &Constraint,
    default: Option<&Candidate>,
    summary: &str,
) -> Diagnostic {
    let mut diag = Diagnostic::warning(format!(
        "no {} toolchain with {} could be found",
        locator.identity(),
        constraint
    ));

    diag = match default {
        Some(candidate) => diag.with_context(format!(
            "the default toolchain {} will be used; be aware that this may cause build issues",
            candidate
        )),
        None => diag.with_context(
            "no default toolchain was found on this machine; actions for this configuration will fail",
        ),
    };

    diag = diag.with_context(summary);

    if locator.all().is_empty() {
        diag.with_suggestion(suggestions::INSTALL_TOOLCHAIN)
    } else {
        diag.with_suggestion(suggestions::RELAX_CONSTRAINT)
    }
}
