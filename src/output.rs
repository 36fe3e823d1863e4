//! Terminal and JSON rendering for completed scan reports

use crate::report::ScanReport;
use colored::Colorize;
use std::fmt::Write;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render a completed report in the requested format
pub fn render(report: &ScanReport, format: OutputFormat) -> crate::Result<String> {
    match format {
        OutputFormat::Json => report.to_json(),
        OutputFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "[*] Scan report for".bold(), report.target);

    if report.hosts.is_empty() {
        let _ = writeln!(out, "{}", "[-] No live hosts found.".yellow());
        return out;
    }

    for host in &report.hosts {
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "{} {}", "[*] Host:".bold(), host.addr.to_string().cyan());

        if host.open_ports.is_empty() {
            let _ = writeln!(out, "    {}", "[-] No open ports found.".yellow());
            continue;
        }

        for port in &host.open_ports {
            match &port.banner {
                Some(banner) => {
                    let _ = writeln!(
                        out,
                        "    {} {}: {}",
                        "[+] Port".green(),
                        port.port.to_string().green().bold(),
                        banner
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "    {} {}: open (no banner received)",
                        "[+] Port".green(),
                        port.port.to_string().green().bold()
                    );
                }
            }

            if let Some(fp) = &port.fingerprint {
                let _ = writeln!(
                    out,
                    "        -> identified as {} {}",
                    fp.product.bold(),
                    fp.version
                );
            }

            if let Some(warning) = &port.lookup_warning {
                let _ = writeln!(
                    out,
                    "        {} {}",
                    "[!] advisory lookup failed:".yellow(),
                    warning
                );
            }

            if !port.advisories.is_empty() {
                let _ = writeln!(out, "        {}", "[!] Known advisories:".red().bold());
                for advisory in &port.advisories {
                    let _ = writeln!(out, "          - {}: {}", advisory.id.red(), advisory.summary);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::ServiceFingerprint;
    use crate::report::{HostReport, PortReport};
    use crate::vuln::VulnerabilityRecord;
    use std::net::Ipv4Addr;

    fn sample_report() -> ScanReport {
        let mut report = ScanReport::new("192.168.1.0/24");
        report.push_host(HostReport {
            addr: Ipv4Addr::new(192, 168, 1, 7),
            open_ports: vec![
                PortReport {
                    port: 22,
                    banner: Some("OpenSSH_8.2".into()),
                    fingerprint: Some(ServiceFingerprint {
                        product: "openssh".into(),
                        version: "8.2".into(),
                    }),
                    advisories: vec![VulnerabilityRecord {
                        id: "CVE-2020-14145".into(),
                        summary: "observable discrepancy".into(),
                    }],
                    lookup_warning: None,
                },
                PortReport {
                    port: 8080,
                    banner: None,
                    fingerprint: None,
                    advisories: Vec::new(),
                    lookup_warning: None,
                },
            ],
        });
        report.push_host(HostReport::new(Ipv4Addr::new(192, 168, 1, 9)));
        report
    }

    #[test]
    fn text_render_mentions_every_observable_outcome() {
        let text = render(&sample_report(), OutputFormat::Text).unwrap();
        assert!(text.contains("192.168.1.7"));
        assert!(text.contains("OpenSSH_8.2"));
        assert!(text.contains("open (no banner received)"));
        assert!(text.contains("CVE-2020-14145"));
        // Zero-open-ports host is recorded explicitly, not omitted
        assert!(text.contains("192.168.1.9"));
        assert!(text.contains("No open ports found."));
    }

    #[test]
    fn json_render_is_machine_readable() {
        let json = render(&sample_report(), OutputFormat::Json).unwrap();
        let parsed: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample_report());
    }
}
