/// Broad storage-access permission gating.
///
/// Android 11 (API level 30) introduced `MANAGE_EXTERNAL_STORAGE`. Older
/// releases have no such restriction, which counts as an implicit grant.

/// First Android SDK level with the "all files access" permission.
pub const ANDROID_MANAGE_STORAGE_SDK: i32 = 30;

/// Apply the Android version gate.
///
/// `live_probe` is only invoked on SDK levels that actually have the
/// permission; its error is passed through untouched.
pub fn android_access_granted<E>(
    sdk_int: i32,
    live_probe: impl FnOnce() -> Result<bool, E>,
) -> Result<bool, E> {
    if sdk_int >= ANDROID_MANAGE_STORAGE_SDK {
        live_probe()
    } else {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_older_releases_are_always_granted() {
        for sdk in 1..ANDROID_MANAGE_STORAGE_SDK {
            let granted = android_access_granted(sdk, || -> Result<bool, Infallible> {
                panic!("live probe must not run on SDK {sdk}")
            });
            assert_eq!(granted, Ok(true), "sdk {sdk}");
        }
    }

    #[test]
    fn test_newer_releases_use_live_probe() {
        for sdk in [30, 33, 34] {
            assert_eq!(android_access_granted(sdk, || Ok::<_, ()>(false)), Ok(false));
            assert_eq!(android_access_granted(sdk, || Ok::<_, ()>(true)), Ok(true));
        }
    }

    #[test]
    fn test_probe_error_is_propagated() {
        let result = android_access_granted(34, || Err("jni detached"));
        assert_eq!(result, Err("jni detached"));
    }
}
