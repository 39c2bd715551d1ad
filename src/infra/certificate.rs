//! Certificate renderer for approved compliance reports.
//!
//! The core only requires a printable document back; the layout here is a
//! self-contained HTML page that prints cleanly. Swapping in a different
//! renderer is a matter of implementing [`CertificateRenderer`].

use chrono::Utc;

use super::{CertificateDocument, CertificateRenderer, CoreError, Result};
use crate::domain::{ComplianceReport, ReportStatus};

/// Renders certificates as printable, self-contained HTML.
pub struct HtmlCertificateRenderer {
    issuer: String,
}

impl HtmlCertificateRenderer {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }
}

impl Default for HtmlCertificateRenderer {
    fn default() -> Self {
        Self::new("Government Authority via Verdantia")
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl CertificateRenderer for HtmlCertificateRenderer {
    fn render(&self, report: &ComplianceReport) -> Result<CertificateDocument> {
        if report.status != ReportStatus::Approved {
            return Err(CoreError::Forbidden(
                "certificate available only for approved reports".to_string(),
            ));
        }

        let issued = Utc::now().format("%Y-%m-%d %H:%M UTC");
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Green Compliance Certificate</title>
<style>
  body {{ font-family: Helvetica, Arial, sans-serif; color: #1b4332; margin: 3em; }}
  .frame {{ border: 3px solid #d8f3dc; padding: 2.5em; }}
  h1 {{ color: #2d6a4f; }}
  h2 {{ color: #40916c; font-weight: normal; font-size: 1em; }}
  dt {{ color: #2d6a4f; font-weight: bold; margin-top: 0.6em; }}
  .footer {{ border-top: 1px solid #d8f3dc; margin-top: 2em; padding-top: 0.8em;
             color: #40916c; font-size: 0.85em; }}
</style>
</head>
<body>
<div class="frame">
<h1>Verdantia Green Compliance Certificate</h1>
<h2>AI-powered Afforestation Planner</h2>
<dl>
  <dt>Project</dt><dd>{project}</dd>
  <dt>Applicant</dt><dd>{applicant}</dd>
  <dt>Selected Species</dt><dd>{species}</dd>
  <dt>Location</dt><dd>Lat {lat}, Lon {lon}</dd>
</dl>
<h2>Planting Location Guidance</h2>
<ul>
  <li>Plant approved species within the project boundary at provided coordinates.</li>
  <li>Prioritize perimeters, open courtyards, and contour lines.</li>
  <li>Maintain mixed clusters with ~1600 saplings/ha for rapid canopy and resilience.</li>
  <li>Use mulching &amp; rainwater harvesting to sustain growth during dry months.</li>
</ul>
<div class="footer">Issued by: {issuer} &middot; {issued}</div>
</div>
</body>
</html>
"#,
            project = escape(&report.project_name),
            applicant = escape(&report.owner_username),
            species = escape(&report.species_choice),
            lat = report.lat,
            lon = report.lon,
            issuer = escape(&self.issuer),
            issued = issued,
        );

        Ok(CertificateDocument {
            bytes: body.into_bytes(),
            content_type: "text/html; charset=utf-8",
            filename: format!("certificate_{}.html", report.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{evaluate, UserId};
    use chrono::Utc;
    use uuid::Uuid;

    fn report(status: ReportStatus) -> ComplianceReport {
        ComplianceReport {
            id: Uuid::new_v4(),
            owner_id: UserId::new(),
            owner_username: "asha".to_string(),
            project_name: "Riverside <Grove>".to_string(),
            species_choice: "Neem".to_string(),
            area_sqm: 800.0,
            trees_planned: 10,
            green_area_sqm: None,
            lat: 28.6,
            lon: 77.2,
            status,
            result: evaluate(800.0, 10, None),
            created_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn renders_approved_report() {
        let doc = HtmlCertificateRenderer::default()
            .render(&report(ReportStatus::Approved))
            .unwrap();
        let html = String::from_utf8(doc.bytes).unwrap();
        assert!(html.contains("Riverside &lt;Grove&gt;"));
        assert!(html.contains("asha"));
        assert!(doc.filename.ends_with(".html"));
    }

    #[test]
    fn refuses_pending_report() {
        let err = HtmlCertificateRenderer::default()
            .render(&report(ReportStatus::Pending))
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
