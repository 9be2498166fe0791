/// Certificate generator: produces the printable HTML awarded on full
/// completion.
///
/// `generate` is a resilience boundary — its only observable outcome is
/// success. The external template is tried first; any failure to find
/// or read it falls back to the embedded template, with the reason
/// carried on the returned value for the host to log.

use std::path::{Path, PathBuf};

use crate::config;

pub const DATE_PLACEHOLDER: &str = "{{DATE}}";
pub const SECRETS_PLACEHOLDER: &str = "{{SECRETS_COUNT}}";
pub const NAME_PLACEHOLDER: &str = "{{NAME}}";

/// Which template produced the document.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    External(PathBuf),
    /// The embedded fallback was used; `reason` says why.
    Embedded { reason: String },
}

#[derive(Clone, Debug)]
pub struct Certificate {
    pub html: String,
    pub source: TemplateSource,
}

impl Certificate {
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, TemplateSource::Embedded { .. })
    }
}

/// Generate the certificate. Never fails: a missing or unreadable
/// template degrades to the embedded one.
///
/// `template_file` is a file name searched through the candidate
/// directories (exe dir, CWD, XDG/system data dirs).
pub fn generate(template_file: &str, date: &str, secrets_count: usize, player_name: &str) -> Certificate {
    match find_template(template_file) {
        Some(path) => generate_from_path(&path, date, secrets_count, player_name),
        None => Certificate {
            html: fill(FALLBACK_TEMPLATE, date, secrets_count, player_name),
            source: TemplateSource::Embedded {
                reason: format!("template '{}' not found", template_file),
            },
        },
    }
}

/// Generate from an explicit template path, falling back on read failure.
pub fn generate_from_path(path: &Path, date: &str, secrets_count: usize, player_name: &str) -> Certificate {
    match std::fs::read_to_string(path) {
        Ok(template) => Certificate {
            html: fill(&template, date, secrets_count, player_name),
            source: TemplateSource::External(path.to_path_buf()),
        },
        Err(e) => Certificate {
            html: fill(FALLBACK_TEMPLATE, date, secrets_count, player_name),
            source: TemplateSource::Embedded {
                reason: format!("could not read {}: {e}", path.display()),
            },
        },
    }
}

/// Write the document to `certificate.html` in the writable data dir.
pub fn save_certificate(html: &str) -> Result<PathBuf, String> {
    let path = config::data_dir().join("certificate.html");
    std::fs::write(&path, html)
        .map_err(|e| format!("could not write {}: {e}", path.display()))?;
    Ok(path)
}

/// Substitute the first occurrence of each placeholder. A placeholder
/// absent from the template is a no-op, not an error; extra occurrences
/// stay literal.
fn fill(template: &str, date: &str, secrets_count: usize, player_name: &str) -> String {
    let html = template.replacen(DATE_PLACEHOLDER, date, 1);
    let html = html.replacen(SECRETS_PLACEHOLDER, &secrets_count.to_string(), 1);
    html.replacen(NAME_PLACEHOLDER, player_name, 1)
}

fn find_template(template_file: &str) -> Option<PathBuf> {
    config::candidate_dirs()
        .into_iter()
        .map(|d| d.join(template_file))
        .find(|p| p.is_file())
}

/// Self-contained print-ready fallback: A4 page, certificate framing,
/// print dialog auto-triggered one second after load.
const FALLBACK_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Awardo Frontend Puzzle Master Certificate</title>
  <style>
    @page { size: A4; margin: 20mm; }
    body {
      font-family: 'Georgia', serif;
      text-align: center;
      padding: 40px;
      background: #DDDDDD;
      color: white;
      margin: 0;
      min-height: 100vh;
      display: flex;
      flex-direction: column;
      justify-content: center;
    }
    .certificate {
      background: white;
      color: #333;
      padding: 60px;
      box-shadow: 0 20px 40px rgba(0,0,0,0.3);
      max-width: 600px;
      margin: 0 auto;
    }
    .header {
      font-size: 28px;
      font-weight: bold;
      color: #2196F3;
      margin-bottom: 20px;
    }
    .achievement {
      font-size: 18px;
      margin: 30px 0;
      line-height: 1.6;
    }
    .date {
      font-size: 16px;
      color: #666;
      margin-top: 40px;
    }
    .signature {
      margin-top: 40px;
      border-top: 1px solid #ddd;
      padding-top: 20px;
      font-style: italic;
    }
    .secrets {
      font-size: 12px;
      color: #999;
      margin-top: 20px;
      font-family: monospace;
    }
  </style>
</head>
<body>
  <div class="certificate">
    <div class="header">&#127942; VERY OFFICIAL AWARDO CERTIFICATION &#127942;</div>
    <div class="achievement">
      This certifies that <strong>{{NAME}}</strong> has successfully completed
      all challenges in the Awardo Frontend Puzzle Challenge, demonstrating mastery of:
      <br><br>
      &bull; DOM Inspection &amp; Manipulation<br>
      &bull; CSS Selector Expertise<br>
      &bull; JavaScript Console Proficiency<br>
      &bull; Local Storage Management<br>
      &bull; Event Listener Implementation<br>
    </div>
    <div class="date">Completed on: {{DATE}}</div>
    <div class="signature">
      Awardo Frontend Academy<br>
      <small>Puzzle Challenge Certification Authority</small>
    </div>
    <div class="secrets">
      Verification Secrets: {{SECRETS_COUNT}} collected
    </div>
  </div>
  <script>
    window.onload = function() {
      setTimeout(function() {
        window.print();
      }, 1000);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_template(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("awardo-cert-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("certificate-template.html");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn external_template_substitutes_all_three_tokens() {
        let path = temp_template(
            "full",
            "<html>{{DATE}} / {{SECRETS_COUNT}} / {{NAME}}</html>",
        );
        let cert = generate_from_path(&path, "2024-01-01", 5, "Ada");
        assert_eq!(cert.html, "<html>2024-01-01 / 5 / Ada</html>");
        assert!(!cert.used_fallback());
        assert!(!cert.html.contains("{{DATE}}"));
        assert!(!cert.html.contains("{{SECRETS_COUNT}}"));
        assert!(!cert.html.contains("{{NAME}}"));
    }

    #[test]
    fn unreachable_template_falls_back_without_error() {
        let path = Path::new("/nonexistent/awardo/certificate-template.html");
        let cert = generate_from_path(path, "2024-01-01", 5, "Ada");
        assert!(cert.used_fallback());
        assert!(!cert.html.is_empty());
        assert!(cert.html.contains("2024-01-01"));
        assert!(cert.html.contains('5'));
        assert!(cert.html.contains("Ada"));
        match cert.source {
            TemplateSource::Embedded { ref reason } => assert!(!reason.is_empty()),
            _ => panic!("expected embedded source"),
        }
    }

    #[test]
    fn zero_secrets_still_renders() {
        let path = Path::new("/nonexistent/awardo/certificate-template.html");
        let cert = generate_from_path(path, "2024-01-01", 0, "Ada");
        assert!(cert.html.contains("Verification Secrets: 0 collected"));
    }

    #[test]
    fn generation_is_deterministic() {
        let path = temp_template("deterministic", "<p>{{NAME}} on {{DATE}}</p>");
        let a = generate_from_path(&path, "2024-01-01", 5, "Ada");
        let b = generate_from_path(&path, "2024-01-01", 5, "Ada");
        assert_eq!(a.html, b.html);
    }

    #[test]
    fn missing_placeholder_is_skipped() {
        let path = temp_template("partial", "<p>{{NAME}} only</p>");
        let cert = generate_from_path(&path, "2024-01-01", 5, "Ada");
        assert_eq!(cert.html, "<p>Ada only</p>");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let path = temp_template("dup", "{{NAME}} and {{NAME}}");
        let cert = generate_from_path(&path, "2024-01-01", 5, "Ada");
        assert_eq!(cert.html, "Ada and {{NAME}}");
    }

    #[test]
    fn fallback_carries_all_three_placeholders_once() {
        assert_eq!(FALLBACK_TEMPLATE.matches(DATE_PLACEHOLDER).count(), 1);
        assert_eq!(FALLBACK_TEMPLATE.matches(SECRETS_PLACEHOLDER).count(), 1);
        assert_eq!(FALLBACK_TEMPLATE.matches(NAME_PLACEHOLDER).count(), 1);
    }
}
