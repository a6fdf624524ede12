//! Utilities for reading and writing data structures from and to disk.
//!
//! Plain data vectors are stored as flat binary files, one file per field.
//! Import the `Load` and `Store` traits and use the `load_from` and
//! `write_to` methods.
//!
//! # Example
//!
//! ```no_run
//! use ch_routing_engine::io::*;
//!
//! let head = Vec::<u32>::load_from("head_file_name")?;
//! let lat = Vec::<i32>::load_from("node_latitude_file_name")?;
//! head.write_to(&"output_file")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{
    fs::{metadata, File},
    io::{prelude::*, Result},
    mem, slice,
};

/// A trait which allows accessing the data of an object as a slice of bytes.
/// Use through the `Store` trait.
pub trait DataBytes {
    fn data_bytes(&self) -> &[u8];
}

/// A trait which mutably exposes the internal data of an object so that a
/// serialized object can be read back into a preallocated buffer.
/// Use through the `Load` trait.
pub trait DataBytesMut {
    fn data_bytes_mut(&mut self) -> &mut [u8];
}

impl<T: Copy> DataBytes for [T] {
    fn data_bytes(&self) -> &[u8] {
        let num_bytes = self.len() * mem::size_of::<T>();
        unsafe { slice::from_raw_parts(self.as_ptr() as *const u8, num_bytes) }
    }
}

impl<T: Copy> DataBytes for Vec<T> {
    fn data_bytes(&self) -> &[u8] {
        self[..].data_bytes()
    }
}

impl<T: Copy> DataBytesMut for Vec<T> {
    fn data_bytes_mut(&mut self) -> &mut [u8] {
        let num_bytes = self.len() * mem::size_of::<T>();
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr() as *mut u8, num_bytes) }
    }
}

/// A trait which extends `DataBytes` with a method to write objects to disk.
pub trait Store: DataBytes {
    /// Writes the serialized object to the file with the given path
    fn write_to<P: AsRef<std::path::Path>>(&self, path: &P) -> Result<()> {
        File::create(path)?.write_all(self.data_bytes())
    }
}

impl<T: DataBytes + ?Sized> Store for T {}

/// A trait to load serialized data back into objects.
pub trait Load: DataBytesMut + Sized {
    /// Create an object of the correct size for serialized data with the
    /// given number of bytes. Not meant to be called directly.
    fn new_with_bytes(num_bytes: usize) -> Self;

    /// Read the file at the given path into a fresh object of the right size.
    fn load_from<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let metadata = metadata(path.as_ref())?;
        let mut file = File::open(path)?;

        let mut object = Self::new_with_bytes(metadata.len() as usize);
        assert_eq!(metadata.len() as usize, object.data_bytes_mut().len());
        file.read_exact(object.data_bytes_mut())?;

        Ok(object)
    }
}

impl<T: Default + Copy> Load for Vec<T> {
    fn new_with_bytes(num_bytes: usize) -> Self {
        assert_eq!(num_bytes % mem::size_of::<T>(), 0);
        let num_elements = num_bytes / mem::size_of::<T>();
        (0..num_elements).map(|_| T::default()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights");
        let data: Vec<u32> = vec![42, 0, u32::MAX, 1337];
        data.write_to(&path).unwrap();
        assert_eq!(Vec::<u32>::load_from(&path).unwrap(), data);
    }
}
