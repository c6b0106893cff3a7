//! Live COM/WMI backend. Each role trait maps to one COM interface:
//! `IWbemServices` for the connection, `IEnumWbemClassObject` for the
//! stream, `IWbemClassObject` for a record. Handle release is the COM
//! wrappers' `Drop`.

use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::{Interface, BSTR, PCWSTR};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoInitializeSecurity, CoSetProxyBlanket, CoUninitialize,
    CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, EOAC_NONE, RPC_C_AUTHN_LEVEL,
    RPC_C_AUTHN_LEVEL_CALL, RPC_C_AUTHN_LEVEL_CONNECT, RPC_C_AUTHN_LEVEL_DEFAULT,
    RPC_C_AUTHN_LEVEL_NONE, RPC_C_AUTHN_LEVEL_PKT, RPC_C_IMP_LEVEL, RPC_C_IMP_LEVEL_ANONYMOUS,
    RPC_C_IMP_LEVEL_DELEGATE, RPC_C_IMP_LEVEL_IDENTIFY, RPC_C_IMP_LEVEL_IMPERSONATE,
};
use windows::Win32::System::Rpc::{
    RPC_C_AUTHN_DEFAULT, RPC_C_AUTHN_WINNT, RPC_C_AUTHZ_DCE, RPC_C_AUTHZ_NAME, RPC_C_AUTHZ_NONE,
};
use windows::Win32::System::Variant::{VariantClear, VARIANT, VT_BSTR, VT_EMPTY, VT_NULL, VT_UI4};
use windows::Win32::System::Wmi::{
    IEnumWbemClassObject, IWbemClassObject, IWbemLocator, IWbemServices, WbemLocator,
    WBEM_GENERIC_FLAG_TYPE, WBEM_INFINITE,
};

use crate::imp::backend::{Backend, Connection, ObjectRecord, ObjectStream};
use crate::{
    AuthOptions, AuthenticationLevel, AuthenticationService, AuthorizationService, Error,
    ImpersonationLevel, QuerySpec, Status, Timeout, Value, ValueTag,
};

static STARTED: AtomicBool = AtomicBool::new(false);

fn com_err(e: windows::core::Error) -> Error {
    Error::from(Status(e.code().0))
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Production backend; the apartment may be brought up at most once per
/// process.
#[derive(Clone, Debug, Default)]
pub struct WmiBackend;

impl WmiBackend {
    pub fn new() -> WmiBackend {
        WmiBackend
    }
}

impl Backend for WmiBackend {
    fn startup(&self) -> Result<(), Error> {
        if STARTED.swap(true, Ordering::SeqCst) {
            return Err(Error::from("communication subsystem already started"));
        }
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr.is_err() {
            STARTED.store(false, Ordering::SeqCst);
            return Err(Error::from(Status(hr.0)));
        }
        Ok(())
    }

    fn configure_security(&self) -> Result<(), Error> {
        unsafe {
            CoInitializeSecurity(
                None,
                -1,
                None,
                None,
                RPC_C_AUTHN_LEVEL_DEFAULT,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
                None,
            )
        }
        .map_err(com_err)
    }

    fn connect(&self, namespace: &str) -> Result<Box<dyn Connection>, Error> {
        let services = unsafe {
            let locator: IWbemLocator =
                CoCreateInstance(&WbemLocator, None, CLSCTX_INPROC_SERVER).map_err(com_err)?;
            locator
                .ConnectServer(
                    &BSTR::from(namespace),
                    &BSTR::new(),
                    &BSTR::new(),
                    &BSTR::new(),
                    0,
                    &BSTR::new(),
                    None,
                )
                .map_err(com_err)?
        };
        Ok(Box::new(WmiConnection { services }))
    }

    fn shutdown(&self) {
        unsafe { CoUninitialize() };
        STARTED.store(false, Ordering::SeqCst);
    }
}

struct WmiConnection {
    services: IWbemServices,
}

fn authn_level(level: AuthenticationLevel) -> RPC_C_AUTHN_LEVEL {
    match level {
        AuthenticationLevel::Default => RPC_C_AUTHN_LEVEL_DEFAULT,
        AuthenticationLevel::None => RPC_C_AUTHN_LEVEL_NONE,
        AuthenticationLevel::Connect => RPC_C_AUTHN_LEVEL_CONNECT,
        AuthenticationLevel::Call => RPC_C_AUTHN_LEVEL_CALL,
        AuthenticationLevel::Pkt => RPC_C_AUTHN_LEVEL_PKT,
    }
}

fn imp_level(level: ImpersonationLevel) -> RPC_C_IMP_LEVEL {
    match level {
        ImpersonationLevel::Anonymous => RPC_C_IMP_LEVEL_ANONYMOUS,
        ImpersonationLevel::Identify => RPC_C_IMP_LEVEL_IDENTIFY,
        ImpersonationLevel::Impersonate => RPC_C_IMP_LEVEL_IMPERSONATE,
        ImpersonationLevel::Delegate => RPC_C_IMP_LEVEL_DELEGATE,
    }
}

impl Connection for WmiConnection {
    fn authorize(&mut self, auth: &AuthOptions) -> Result<(), Error> {
        let authn = match auth.authentication {
            AuthenticationService::Default => RPC_C_AUTHN_DEFAULT as u32,
            AuthenticationService::Winnt => RPC_C_AUTHN_WINNT,
        };
        let authz = match auth.authorization {
            AuthorizationService::None => RPC_C_AUTHZ_NONE,
            AuthorizationService::Name => RPC_C_AUTHZ_NAME,
            AuthorizationService::Dce => RPC_C_AUTHZ_DCE,
        };
        unsafe {
            let unknown = self.services.cast::<windows::core::IUnknown>().map_err(com_err)?;
            CoSetProxyBlanket(
                &unknown,
                authn,
                authz,
                None,
                authn_level(auth.level),
                imp_level(auth.impersonation),
                None,
                EOAC_NONE,
            )
        }
        .map_err(com_err)
    }

    fn exec_query(&self, spec: &QuerySpec) -> Result<Box<dyn ObjectStream>, Error> {
        let enumerator = unsafe {
            self.services
                .ExecQuery(
                    &BSTR::from(spec.language.as_str()),
                    &BSTR::from(spec.text.as_str()),
                    WBEM_GENERIC_FLAG_TYPE(spec.flags.bits() as i32),
                    None,
                )
                .map_err(com_err)?
        };
        Ok(Box::new(WmiStream { enumerator }))
    }
}

struct WmiStream {
    enumerator: IEnumWbemClassObject,
}

impl ObjectStream for WmiStream {
    fn next(&mut self, timeout: Timeout) -> Result<Option<Box<dyn ObjectRecord>>, Error> {
        let wait = match timeout {
            Timeout::Infinite => WBEM_INFINITE.0,
            Timeout::Millis(ms) => ms as i32,
        };
        let mut objects: [Option<IWbemClassObject>; 1] = [None];
        let mut returned = 0u32;
        let hr = unsafe { self.enumerator.Next(wait, &mut objects, &mut returned) };
        if hr.is_err() {
            return Err(Error::from(Status(hr.0)));
        }
        if returned == 0 {
            return Ok(None);
        }
        match objects[0].take() {
            Some(object) => Ok(Some(Box::new(WmiRecord { object }))),
            None => Ok(None),
        }
    }
}

struct WmiRecord {
    object: IWbemClassObject,
}

impl ObjectRecord for WmiRecord {
    fn get(&self, field: &str) -> (Status, Value) {
        let name = to_wide(field);
        let mut cell = VARIANT::default();
        let result = unsafe {
            self.object
                .Get(PCWSTR(name.as_ptr()), 0, &mut cell, None, None)
        };
        if let Err(e) = result {
            return (Status(e.code().0), Value::Empty);
        }
        let value = unsafe {
            let vt = cell.Anonymous.Anonymous.vt;
            match vt {
                VT_BSTR => Value::String((*cell.Anonymous.Anonymous.Anonymous.bstrVal).to_string()),
                VT_UI4 => Value::U32(cell.Anonymous.Anonymous.Anonymous.ulVal),
                VT_EMPTY => Value::Empty,
                VT_NULL => Value::Null,
                other => Value::Other(ValueTag(other.0)),
            }
        };
        // The cell owns its string buffer; clear it before the next read.
        unsafe {
            let _ = VariantClear(&mut cell);
        }
        (Status::OK, value)
    }
}
