#![allow(unsafe_code)]

use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use crate::error::{HostError, Result};

/// Membership of the calling thread in the multithreaded COM apartment.
///
/// Left again on drop.  Not `Send`: the apartment belongs to the thread that
/// entered it.
#[derive(Debug)]
pub struct Apartment {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl Apartment {
    pub fn enter() -> Result<Self> {
        // SAFETY: no reserved pointer is passed.  Every successful call,
        // including S_FALSE for an already-initialised thread, is balanced by
        // the CoUninitialize in Drop.
        unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
            .ok()
            .map_err(|e| apartment_error(&e))?;
        log::debug!("entered multithreaded apartment");
        Ok(Self {
            _not_send: std::marker::PhantomData,
        })
    }
}

fn apartment_error(error: &windows::core::Error) -> HostError {
    HostError::Win32 {
        function: "CoInitializeEx",
        code: error.code().0 as u32,
    }
}

impl Drop for Apartment {
    fn drop(&mut self) {
        // SAFETY: paired with the successful CoInitializeEx in `enter`, on the
        // same thread (Apartment is !Send).
        unsafe { CoUninitialize() };
    }
}

#[cfg(test)]
mod tests {
    use windows::Win32::Foundation::RPC_E_CHANGED_MODE;

    use super::*;

    #[test]
    fn failure_names_co_initialize() {
        let err = apartment_error(&windows::core::Error::from(RPC_E_CHANGED_MODE));
        assert!(matches!(
            err,
            HostError::Win32 { function: "CoInitializeEx", code } if code == RPC_E_CHANGED_MODE.0 as u32
        ));
        assert!(err.to_string().starts_with("CoInitializeEx failed"));
    }

    #[test]
    fn apartment_can_be_entered_twice_on_one_thread() {
        let outer = Apartment::enter().expect("outer");
        let inner = Apartment::enter().expect("inner");
        drop(inner);
        drop(outer);
    }
}
