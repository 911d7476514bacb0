/// Receiver of the text a script writes.
pub trait SystemContext {
    fn write(&mut self, text: &str);
}

impl SystemContext for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Writes script output straight to stdout.
pub struct StdioContext;

impl SystemContext for StdioContext {
    fn write(&mut self, text: &str) {
        print!("{text}");
    }
}

/// Collects output across several runs, one entry per run.
#[derive(Debug, Default)]
pub struct BufferedContext {
    runs: Vec<String>,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[String] {
        &self.runs
    }

    pub fn into_data(self) -> String {
        self.runs.concat()
    }
}

impl SystemContext for BufferedContext {
    fn write(&mut self, text: &str) {
        self.runs.push(text.to_string());
    }
}
