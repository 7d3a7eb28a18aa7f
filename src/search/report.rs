use super::template::Template;
use crate::rank::Confidence;
use crate::AgentId;
use crate::Stamp;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// one ranked search result: the agents bound to the template's
/// variables in order, the start of every sequential stage plus the
/// final end, and the accumulated confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub agents: Vec<AgentId>,
    pub times: Vec<Stamp>,
    pub confidence: Confidence,
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "agents [{}] from {} to {} with {}",
            self.agents.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", "),
            self.times.first().map(|t| t.to_string()).unwrap_or_default(),
            self.times.last().map(|t| t.to_string()).unwrap_or_default(),
            self.confidence,
        )
    }
}

/// persist ranked matches in the downstream-consumed layout:
/// one agent column per variable, one timestamp column per stage plus
/// the behavior end, then the confidence fraction
pub fn write_csv(path: &Path, template: &Template, matches: &[Match]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create result file {}", path.display()))?;
    let mut file = std::io::BufWriter::new(file);
    let header = template
        .variables()
        .iter()
        .map(|var| format!("Agent {}", var))
        .chain(template.stage_names().iter().map(|name| format!("Node {}", name)))
        .chain([
            "Behavior end".to_string(),
            "Confidence nom".to_string(),
            "Confidence denom".to_string(),
        ])
        .collect::<Vec<_>>();
    writeln!(file, "{}", row(&header))?;
    for found in matches {
        let fields = found
            .agents
            .iter()
            .map(|id| id.to_string())
            .chain(found.times.iter().map(|t| t.format(STAMP_FORMAT).to_string()))
            .chain([
                found.confidence.nom().to_string(),
                found.confidence.denom().to_string(),
            ])
            .collect::<Vec<_>>();
        writeln!(file, "{}", row(&fields))?;
    }
    file.flush()?;
    Ok(())
}

/// minimal csv quoting: fields carrying separators or quotes get
/// wrapped and their quotes doubled
fn row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| {
            if field.contains(',') || field.contains('"') || field.contains('\n') {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
