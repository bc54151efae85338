use std::string::FromUtf8Error;
use std::{
    io,
    sync::{Arc, RwLock},
};

/// In-memory diagnostic stream shared between a checker and the test
#[derive(Clone, Default)]
#[repr(transparent)]
pub struct TestStdio(Arc<RwLock<Vec<u8>>>);

impl TestStdio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.read().unwrap().clone()
    }

    pub fn try_to_string(&self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.to_vec())
    }

    pub fn lines(&self) -> Vec<String> {
        self.try_to_string()
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }
}

impl io::Write for TestStdio {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write().unwrap().extend(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
