//! The loopback module provides an instrument simulator for testing purposes.
//!
//! The [`LoopbackInterface`] allows you to test instrument drivers without hardware attached. It
//! is scripted with the commands that are expected to go from the host to the instrument and the
//! replies the instrument would send back. Expected commands are plain strings, since SCPI
//! commands are always ASCII; replies are raw byte vectors, so that a scripted session can mix
//! text replies with binary waveform blocks that are not valid UTF-8.

use std::collections::VecDeque;

use crate::{InterfaceError, ScopeInterface};

/// An interface that allows you to simply write tests for your instrument driver.
///
/// Commands and replies are consumed in order. Whenever something is sent to the instrument that
/// is not expected next, the [`LoopbackInterface`] panics. When it is dropped, a `finalize`
/// function is called that panics if scripted commands or replies are left unused. An empty
/// loopback interface therefore doubles as an assertion that a code path performs no instrument
/// I/O at all.
///
/// The terminator given at construction is the wire terminator: it is appended to every expected
/// command before comparison and to every scripted reply before it is handed out.
///
/// # Example
///
/// ```
/// use scopers::{LoopbackInterface, ScopeInterface};
///
/// let from_host = vec!["*IDN?".to_string()];
/// let from_inst = vec![b"AGILENT TECHNOLOGIES,DSO5012A,MY00012345,04.00".to_vec()];
/// let mut loopback = LoopbackInterface::new(from_host, from_inst, "\n");
///
/// let idn = loopback.query("*IDN?").unwrap();
/// assert!(idn.starts_with("AGILENT"));
/// ```
pub struct LoopbackInterface {
    from_host: Vec<String>,
    from_inst: Vec<Vec<u8>>,
    terminator_exp: String,
    from_host_index: IncrIndex,
    from_inst_index: IncrIndex,
    curr_bytes: VecDeque<u8>,
    terminator: String,
}

impl LoopbackInterface {
    /// Create a new loopback instrument with given commands to and from the instrument.
    ///
    /// # Arguments:
    /// * `from_host` - Commands expected from host to instrument, in order, without terminator.
    /// * `from_inst` - Replies from instrument to host, in order, without terminator.
    /// * `terminator_exp` - The expected wire terminator.
    pub fn new(from_host: Vec<String>, from_inst: Vec<Vec<u8>>, terminator_exp: &str) -> Self {
        LoopbackInterface {
            from_host,
            from_inst,
            terminator_exp: terminator_exp.to_string(),
            from_host_index: IncrIndex::default(),
            from_inst_index: IncrIndex::default(),
            curr_bytes: VecDeque::new(),
            terminator: "\n".to_string(),
        }
    }

    /// This command panics if not all scripted commands and replies have been used.
    ///
    /// It is automatically called when the [`LoopbackInterface`] is dropped, but you can also
    /// call it manually.
    pub fn finalize(&mut self) {
        let from_host_leftover = self.from_host.get(self.from_host_index.next());
        let from_inst_leftover = self.from_inst.get(self.from_inst_index.next());
        if let Some(fhl) = from_host_leftover {
            panic!("Leftover expected commands found from host to instrument: {fhl}");
        }
        if let Some(fil) = from_inst_leftover {
            panic!("Leftover expected replies found from instrument to host: {fil:?}");
        }
    }

    /// Get the next command from host to instrument, or panic.
    fn get_next_from_host(&mut self) -> &str {
        self.from_host
            .get(self.from_host_index.next())
            .expect("No more commands were expected from host to instrument.")
    }

    /// Get the next reply from instrument to host, or panic.
    fn get_next_from_inst(&mut self) -> &Vec<u8> {
        self.from_inst
            .get(self.from_inst_index.next())
            .expect("No more replies were expected from instrument to host.")
    }

    /// Read exactly one byte from the scripted replies.
    ///
    /// This panics if there are no more replies. If a byte is required but none was scripted, the
    /// panic is justified as this is a test interface.
    fn read_one_byte(&mut self) -> u8 {
        match self.curr_bytes.pop_front() {
            Some(byte) => byte,
            None => {
                let next_reply = self.get_next_from_inst().clone();
                self.curr_bytes = next_reply
                    .into_iter()
                    .chain(self.terminator_exp.bytes())
                    .collect();
                self.read_one_byte()
            }
        }
    }
}

impl ScopeInterface for LoopbackInterface {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InterfaceError> {
        for byte in buf.iter_mut() {
            *byte = self.read_one_byte();
        }
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), InterfaceError> {
        let next_from_host = self.get_next_from_host().to_string();
        let exp = format!("{}{}", next_from_host, self.terminator_exp);
        assert_eq!(
            exp.as_bytes(),
            data,
            "Expected sendcmd '{0}', got '{1:?}'",
            exp,
            std::str::from_utf8(data)
        );
        Ok(())
    }
}

impl Drop for LoopbackInterface {
    fn drop(&mut self) {
        self.finalize();
    }
}

/// A self-incrementing index structure that by default starts at 0 and increments whenever `next`
/// is called.
#[derive(Debug, Default)]
struct IncrIndex {
    index: usize,
}

impl IncrIndex {
    fn next(&mut self) -> usize {
        let current = self.index;
        self.index += 1;
        current
    }
}
