//! Crawl outcome counters and the end-of-run summary

/// Counters accumulated over one crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages fetched and persisted
    pub pages_downloaded: u64,

    /// Resources (CSS, JS, images, fonts) fetched and persisted
    pub resources_downloaded: u64,

    /// Responses that redirected elsewhere
    pub redirects: u64,

    /// URLs that exhausted the retry policy or failed in transit
    pub failures: u64,

    /// URLs skipped by the mapping or the already-crawled hook
    pub skipped: u64,

    /// Distinct URLs admitted to the crawl
    pub urls_admitted: u64,

    /// Bytes handed to the mirror writer
    pub bytes_written: u64,
}

impl CrawlReport {
    /// Total fetch attempts that reached a terminal outcome.
    pub fn total_processed(&self) -> u64 {
        self.pages_downloaded + self.resources_downloaded + self.redirects + self.failures
            + self.skipped
    }
}

/// Prints the report to stdout in a formatted manner.
pub fn print_report(report: &CrawlReport) {
    println!("=== Mirror Summary ===\n");

    println!("Downloads:");
    println!("  Pages: {}", report.pages_downloaded);
    println!("  Resources: {}", report.resources_downloaded);
    println!("  Bytes written: {}", report.bytes_written);
    println!();

    println!("Traversal:");
    println!("  URLs admitted: {}", report.urls_admitted);
    println!("  Redirects: {}", report.redirects);
    println!("  Skipped: {}", report.skipped);
    println!("  Failures: {}", report.failures);
    println!();

    let downloaded = report.pages_downloaded + report.resources_downloaded;
    let success_rate = if report.total_processed() > 0 {
        (downloaded as f64 / report.total_processed() as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} URLs downloaded)",
        success_rate,
        downloaded,
        report.total_processed()
    );
}
