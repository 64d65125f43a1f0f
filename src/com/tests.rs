use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use super::{Com, ComError, ComResult};

pub struct TestCom {
    name: String,
    write_buf: Arc<Mutex<VecDeque<u8>>>,
    read_buf: Arc<Mutex<VecDeque<u8>>>,
    pub cmd_table: HashMap<u8, String>,
    silent: bool,
}

pub fn indent_receiver() {
    print!("\t\t\t\t\t\t");
}

impl Com for TestCom {
    fn get_name(&self) -> &'static str {
        "Test_Com"
    }

    fn read_data(&mut self) -> ComResult<Option<Vec<u8>>> {
        let result: Vec<u8> = self.read_buf.lock().unwrap().drain(0..).collect();
        if result.is_empty() {
            // nothing buffered models an elapsed read deadline
            return Ok(None);
        }

        if !self.silent {
            if self.name == "receiver" {
                indent_receiver();
            }

            if result.len() == 1 {
                if let Some(cmd) = self.cmd_table.get(&result[0]) {
                    println!("{} reads {}({} 0x{:X})", self.name, cmd, result[0], result[0]);
                } else {
                    println!("{} reads {} 0x{:X}", self.name, result[0], result[0]);
                }
            } else {
                println!("{} reads {:?} #{}", self.name, result, result.len());
            }
        }

        Ok(Some(result))
    }

    fn send(&mut self, buf: &[u8]) -> ComResult<usize> {
        if !self.silent {
            if self.name == "receiver" {
                indent_receiver();
            }

            if buf.len() == 1 {
                if let Some(cmd) = self.cmd_table.get(&buf[0]) {
                    println!("{} writes {}({} 0x{:X})", self.name, cmd, buf[0], buf[0]);
                } else {
                    println!("{} writes {} 0x{:X}", self.name, buf[0], buf[0]);
                }
            } else if buf.len() <= 32 {
                println!("{} writes {:?} #{}", self.name, buf, buf.len());
            } else {
                println!("{} writes #{} bytes", self.name, buf.len());
            }
        }
        self.write_buf.lock().unwrap().extend(buf.iter());
        Ok(buf.len())
    }
}

/// Two crossed `TestCom`s: whatever the sender writes, the receiver reads,
/// and the other way round. Protocol tests seed the receiver side with the
/// cart's scripted answers before driving the sender side.
pub struct TestChannel {
    pub sender: Box<dyn Com>,
    pub receiver: Box<dyn Com>,
}

impl TestChannel {
    pub fn new(silent: bool) -> Self {
        TestChannel::from_cmd_table(HashMap::new(), silent)
    }

    pub fn from_cmd_table(cmd_table: HashMap<u8, String>, silent: bool) -> Self {
        let b1 = Arc::new(Mutex::new(VecDeque::new()));
        let b2 = Arc::new(Mutex::new(VecDeque::new()));
        Self {
            sender: Box::new(TestCom {
                name: "sender".to_string(),
                read_buf: b1.clone(),
                write_buf: b2.clone(),
                cmd_table: cmd_table.clone(),
                silent,
            }),
            receiver: Box::new(TestCom {
                name: "receiver".to_string(),
                read_buf: b2,
                write_buf: b1,
                cmd_table,
                silent,
            }),
        }
    }
}

/// Follows a script of per-call outcomes, then accepts everything. Bytes
/// that were accepted land in `accepted` in arrival order.
pub enum SendStep {
    Accept(usize),
    Busy,
    Fail,
}

pub struct FlakyCom {
    script: VecDeque<SendStep>,
    pub accepted: Vec<u8>,
}

impl FlakyCom {
    pub fn new(script: Vec<SendStep>) -> Self {
        Self {
            script: script.into(),
            accepted: Vec::new(),
        }
    }
}

impl Com for FlakyCom {
    fn get_name(&self) -> &'static str {
        "Flaky_Com"
    }

    fn send(&mut self, buf: &[u8]) -> ComResult<usize> {
        match self.script.pop_front() {
            Some(SendStep::Accept(max)) => {
                let n = max.min(buf.len());
                self.accepted.extend_from_slice(&buf[..n]);
                Ok(n)
            }
            Some(SendStep::Busy) => Err(ComError::Busy),
            Some(SendStep::Fail) => Err(ComError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "cable pulled",
            ))),
            None => {
                self.accepted.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn read_data(&mut self) -> ComResult<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Accepts every write, fails every read with a fatal error.
pub struct BrokenCom {}

impl Com for BrokenCom {
    fn get_name(&self) -> &'static str {
        "Broken_Com"
    }

    fn send(&mut self, buf: &[u8]) -> ComResult<usize> {
        Ok(buf.len())
    }

    fn read_data(&mut self) -> ComResult<Option<Vec<u8>>> {
        Err(ComError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "device dropped off the bus",
        )))
    }
}

mod communication_tests {
    use crate::com::{send_all, ComError, FlakyCom, SendStep, TestChannel};

    #[test]
    fn test_simple() {
        let mut test = TestChannel::new(false);
        let t = b"Hello World";
        let _ = test.sender.send(t);
        assert_eq!(t.to_vec(), test.receiver.read_data().unwrap().unwrap());
        let _ = test.receiver.send(t);
        assert_eq!(t.to_vec(), test.sender.read_data().unwrap().unwrap());
    }

    #[test]
    fn empty_buffer_reads_as_deadline() {
        let mut test = TestChannel::new(true);
        assert!(test.sender.read_data().unwrap().is_none());
    }

    #[test]
    fn send_all_reassembles_short_writes() {
        let mut com = FlakyCom::new(vec![
            SendStep::Accept(3),
            SendStep::Accept(1),
            SendStep::Accept(64),
        ]);
        send_all(&mut com, b"0123456789").unwrap();
        assert_eq!(com.accepted, b"0123456789");
    }

    #[test]
    fn send_all_retries_after_busy() {
        let mut com = FlakyCom::new(vec![
            SendStep::Busy,
            SendStep::Accept(4),
            SendStep::Busy,
            SendStep::Accept(64),
        ]);
        send_all(&mut com, b"abcdefgh").unwrap();
        assert_eq!(com.accepted, b"abcdefgh");
    }

    #[test]
    fn send_all_aborts_on_fatal_error() {
        let mut com = FlakyCom::new(vec![SendStep::Accept(2), SendStep::Fail]);
        let err = send_all(&mut com, b"abcdef").unwrap_err();
        assert!(matches!(err, ComError::Io(_)));
        assert_eq!(com.accepted, b"ab");
    }
}
