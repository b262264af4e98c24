use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use rustyline::Editor;
use tracing::debug;

/// Text surface the machine talks to.
pub trait Console {
    fn write(&mut self, text: &str);

    fn clear(&mut self);

    /// Blocks until a line is committed. `None` means no more input will
    /// ever arrive.
    fn read(&mut self) -> Option<String>;
}

impl<C> Console for &mut C
where
    C: Console + ?Sized,
{
    fn write(&mut self, text: &str) {
        <C as Console>::write(self, text)
    }

    fn clear(&mut self) {
        <C as Console>::clear(self)
    }

    fn read(&mut self) -> Option<String> {
        <C as Console>::read(self)
    }
}

/// Editable transcript of a console session.
///
/// While a read is pending, text may be typed and erased after the read's
/// start offset; everything before it is protected. A confirm captures the
/// typed text, terminates the line and ends the read.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    text: String,
    input_start: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn write(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.input_start = None;
    }

    pub fn is_reading(&self) -> bool {
        self.input_start.is_some()
    }

    /// Starts a read at the end of the transcript. A trailing newline is
    /// dropped so the answer is typed on the prompt's line.
    pub fn begin_read(&mut self) {
        if self.text.ends_with('\n') {
            self.text.pop();
        }
        self.input_start = Some(self.text.len());
    }

    /// Types text at the end of the transcript. Ignored unless reading.
    pub fn insert(&mut self, text: &str) {
        if self.is_reading() {
            self.text.push_str(text);
        }
    }

    /// Erases the last typed character. Protected text is never erased.
    pub fn backspace(&mut self) -> bool {
        match self.input_start {
            Some(start) if self.text.len() > start => self.text.pop().is_some(),
            _ => false,
        }
    }

    /// Commits the pending read and returns what was typed since it began.
    pub fn confirm(&mut self) -> Option<String> {
        let start = self.input_start.take()?;
        let line = self.text[start..].to_string();
        self.text.push('\n');
        Some(line)
    }
}

/// Console fed from a fixed list of input lines; useful for tests and batch
/// runs. Inputs are echoed into the transcript as if typed.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    transcript: Transcript,
    output: String,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Transcript::new(),
            output: String::new(),
        }
    }

    pub fn transcript(&self) -> &str {
        self.transcript.text()
    }

    /// Everything written by the program, without echoed input.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
        self.transcript.write(text);
    }

    fn clear(&mut self) {
        self.output.clear();
        self.transcript.clear();
    }

    fn read(&mut self) -> Option<String> {
        let line = self.inputs.pop_front()?;
        self.transcript.begin_read();
        self.transcript.insert(&line);
        self.transcript.confirm()
    }
}

type Shared = Arc<Mutex<Transcript>>;

fn lock(transcript: &Shared) -> MutexGuard<'_, Transcript> {
    // a panic while holding the lock cannot leave the transcript half-updated
    transcript.lock().unwrap_or_else(|e| e.into_inner())
}

/// Machine side of a console whose input comes from another thread.
///
/// `read` parks the calling thread until the paired [`ConsoleHandle`]
/// confirms a line, or returns `None` once the handle is dropped.
pub struct ChannelConsole {
    transcript: Shared,
    lines: Receiver<String>,
}

/// User side of a [`ChannelConsole`].
#[derive(Clone)]
pub struct ConsoleHandle {
    transcript: Shared,
    lines: Sender<String>,
}

pub fn channel() -> (ChannelConsole, ConsoleHandle) {
    let transcript = Shared::default();
    let (tx, rx) = mpsc::channel();

    let console = ChannelConsole {
        transcript: transcript.clone(),
        lines: rx,
    };
    let handle = ConsoleHandle {
        transcript,
        lines: tx,
    };

    (console, handle)
}

impl Console for ChannelConsole {
    fn write(&mut self, text: &str) {
        lock(&self.transcript).write(text);
    }

    fn clear(&mut self) {
        lock(&self.transcript).clear();
    }

    fn read(&mut self) -> Option<String> {
        lock(&self.transcript).begin_read();
        debug!("waiting for input");
        self.lines.recv().ok()
    }
}

impl ConsoleHandle {
    pub fn transcript(&self) -> String {
        lock(&self.transcript).text().to_string()
    }

    pub fn is_reading(&self) -> bool {
        lock(&self.transcript).is_reading()
    }

    pub fn type_text(&self, text: &str) {
        lock(&self.transcript).insert(text);
    }

    pub fn backspace(&self) -> bool {
        lock(&self.transcript).backspace()
    }

    /// Commits the pending read and wakes the machine. Returns `false` if no
    /// read was pending.
    pub fn confirm(&self) -> bool {
        let line = lock(&self.transcript).confirm();

        match line {
            Some(line) => self.lines.send(line).is_ok(),
            None => false,
        }
    }
}

/// Standard output plus line editing through rustyline.
pub struct Terminal<'a> {
    editor: &'a mut Editor<()>,
    pending: String,
}

impl<'a> Terminal<'a> {
    pub fn new(editor: &'a mut Editor<()>) -> Self {
        Terminal {
            editor,
            pending: String::new(),
        }
    }
}

impl Console for Terminal<'_> {
    fn write(&mut self, text: &str) {
        // the last unterminated line becomes the prompt of the next read
        let mut lines = text.rsplitn(2, '\n');
        let tail = lines.next().unwrap_or_default();

        match lines.next() {
            Some(head) => {
                println!("{}{}", self.pending, head);
                self.pending = tail.to_string();
            }
            None => self.pending.push_str(tail),
        }
        io::stdout().flush().ok();
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn read(&mut self) -> Option<String> {
        let prompt = std::mem::take(&mut self.pending);
        let line = self.editor.readline(&prompt).ok()?;
        self.editor.add_history_entry(line.as_str());
        Some(line)
    }
}

impl Drop for Terminal<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            println!("{}", self.pending);
        }
    }
}
