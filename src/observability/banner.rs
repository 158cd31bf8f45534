//! Console banner for interactive runs.

const LOGO: &str = "\
█ █ █ ██▀ █   █ █▀▄ │ WEB-BASED, READ-ONLY
▀▄▀ █ █▄▄ ▀▄▀▄▀ █▀▄ │ FILE BROWSER ───── •";

/// The logo followed by `message`, one trailing newline.
pub fn render(message: &str) -> String {
    format!("\n{}\n{}\n", LOGO, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_ends_with_message() {
        let banner = render("Web-based file browser");
        assert!(banner.contains("FILE BROWSER"));
        assert!(banner.ends_with("Web-based file browser\n"));
    }
}
