/// Android storage backend.
///
/// Talks to the Android framework over JNI through the process-wide
/// context published by `ndk-context`: app-scoped external directories
/// come from `Context.getExternalFilesDirs(null)`, the release string from
/// `Build.VERSION.RELEASE` and the all-files-access grant from
/// `Environment.isExternalStorageManager()`.
use super::permissions::android_access_granted;
use super::{statvfs, StorageBackend};
use crate::config::Config;
use crate::model::BlockStats;
use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};
use std::io;
use std::path::{Path, PathBuf};

const BUILD_VERSION: &str = "android/os/Build$VERSION";

/// Local references created by one query never exceed this.
const LOCAL_FRAME_CAPACITY: i32 = 32;

#[derive(Debug, Clone, Default)]
pub struct AndroidBackend {
    extra_roots: Vec<PathBuf>,
}

impl AndroidBackend {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extra_roots: config.extra_roots.clone(),
        }
    }
}

impl StorageBackend for AndroidBackend {
    fn platform_name(&self) -> &'static str {
        "Android"
    }

    fn os_version(&self) -> Option<String> {
        with_jni(|env, _| release(env))
            .map_err(|e| tracing::warn!("Build.VERSION.RELEASE unavailable: {e}"))
            .ok()
    }

    fn full_storage_access(&self) -> bool {
        let result = with_jni(|env, _| {
            let sdk = sdk_int(env)?;
            tracing::debug!("Android SDK version: {sdk}");
            android_access_granted(sdk, || is_external_storage_manager(env))
        });
        match result {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!("Storage-manager probe failed, reporting not granted: {e}");
                false
            }
        }
    }

    fn storage_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut dirs = with_jni(external_files_dirs)
            .map_err(|e| io::Error::other(format!("getExternalFilesDirs failed: {e}")))?;
        dirs.extend(self.extra_roots.iter().cloned());
        Ok(dirs)
    }

    fn block_stats(&self, path: &Path) -> io::Result<BlockStats> {
        statvfs::block_stats(path)
    }
}

/// Run `f` on an attached JNI env inside its own local reference frame,
/// so every local reference is released when `f` returns.
fn with_jni<F, T>(f: F) -> Result<T, jni::errors::Error>
where
    F: FnOnce(&mut JNIEnv, &JObject) -> Result<T, jni::errors::Error>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }?;
    let mut env = vm.attach_current_thread()?;
    let context = unsafe { JObject::from_raw(ctx.context().cast()) };
    env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env, &context))
}

fn sdk_int(env: &mut JNIEnv) -> Result<i32, jni::errors::Error> {
    env.get_static_field(BUILD_VERSION, "SDK_INT", "I")?.i()
}

fn release(env: &mut JNIEnv) -> Result<String, jni::errors::Error> {
    let value = env
        .get_static_field(BUILD_VERSION, "RELEASE", "Ljava/lang/String;")?
        .l()?;
    java_string(env, value)
}

fn is_external_storage_manager(env: &mut JNIEnv) -> Result<bool, jni::errors::Error> {
    env.call_static_method(
        "android/os/Environment",
        "isExternalStorageManager",
        "()Z",
        &[],
    )?
    .z()
}

/// `context.getExternalFilesDirs(null)`, skipping the `null` entries the
/// framework returns for media that is currently unmounted.
fn external_files_dirs(
    env: &mut JNIEnv,
    context: &JObject,
) -> Result<Vec<PathBuf>, jni::errors::Error> {
    let null_type = JObject::null();
    let dirs: JObjectArray = env
        .call_method(
            context,
            "getExternalFilesDirs",
            "(Ljava/lang/String;)[Ljava/io/File;",
            &[JValue::Object(&null_type)],
        )?
        .l()?
        .into();

    let len = env.get_array_length(&dirs)?;
    let mut paths = Vec::with_capacity(len as usize);
    for i in 0..len {
        let file = env.get_object_array_element(&dirs, i)?;
        if file.is_null() {
            tracing::debug!("External files dir {i} is unmounted");
            continue;
        }
        let path = env
            .call_method(&file, "getAbsolutePath", "()Ljava/lang/String;", &[])?
            .l()?;
        paths.push(PathBuf::from(java_string(env, path)?));
        env.delete_local_ref(file)?;
    }
    Ok(paths)
}

fn java_string(env: &mut JNIEnv, value: JObject) -> Result<String, jni::errors::Error> {
    let value = JString::from(value);
    let text: String = env.get_string(&value)?.into();
    Ok(text)
}
