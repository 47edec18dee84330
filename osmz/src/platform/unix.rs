use libc;
use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd};

/// If `file` is fd 1, give up ownership without closing it.
pub fn release_stdout(file: File) -> Option<File> {
    if file.as_raw_fd() != libc::STDOUT_FILENO {
        return Some(file);
    }

    let _ = file.into_raw_fd();
    None
}

// Dropping a File throws away the result of close(2), which is where some
// filesystems (NFS in particular) report deferred write errors.
pub fn close_file(file: File) -> io::Result<()> {
    let fd = file.into_raw_fd();
    if unsafe { libc::close(fd) } != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub fn remove_buffered_pages(file: &File, upto: Option<u64>) -> io::Result<()> {
    // A length of 0 tells the kernel "to the end of the file".
    let len = match upto {
        Some(0) => return Ok(()),
        Some(n) => n as libc::off_t,
        None => 0,
    };

    let ret = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, len, libc::POSIX_FADV_DONTNEED) };
    if ret != 0 {
        return Err(io::Error::from_raw_os_error(ret));
    }

    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
pub fn remove_buffered_pages(_file: &File, _upto: Option<u64>) -> io::Result<()> {
    Ok(())
}
