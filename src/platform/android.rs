//! Android backend: AppOps, PackageManager and UsageStatsManager over JNI.
//!
//! The JVM and application `Context` come from `ndk-context`, which the host
//! activity populates before any command runs. Every failed call clears the
//! pending Java exception so the next call on the same thread starts clean.

#![allow(
    unsafe_code,
    reason = "JavaVM and Context arrive as raw pointers from ndk-context"
)]

use super::{
    argb_to_rgba, AccessMode, IconSource, PackageEntry, RawUsageStats, RgbaIcon, UsagePlatform,
    UsageStatsService,
};
use crate::error::PlatformError;
use crate::models::TimeRange;
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

const APP_OPS_SERVICE: &str = "appops";
const USAGE_STATS_SERVICE: &str = "usagestats";
const OPSTR_GET_USAGE_STATS: &str = "android:get_usage_stats";
const ACTION_USAGE_ACCESS_SETTINGS: &str = "android.settings.USAGE_ACCESS_SETTINGS";
const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;
const GET_META_DATA: i32 = 0x80;
const FLAG_SYSTEM: i32 = 0x1;
/// `Build.VERSION_CODES.LOLLIPOP`, first release with usage stats
const MIN_SDK_USAGE_STATS: i32 = 21;
/// Local references created while reading one list item
const ITEM_FRAME_CAPACITY: i32 = 16;

pub struct AndroidPlatform {
    vm: JavaVM,
    context: GlobalRef,
}

impl AndroidPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }?;
        let context = {
            let mut env = vm.attach_current_thread()?;
            let raw = unsafe { JObject::from_raw(ctx.context().cast()) };
            env.new_global_ref(raw)?
        };
        Ok(Self { vm, context })
    }

    fn with_env<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T, PlatformError>,
    ) -> Result<T, PlatformError> {
        let mut guard = self.vm.attach_current_thread()?;
        let env: &mut JNIEnv<'_> = &mut guard;
        f(env, self.context.as_obj())
    }
}

impl UsagePlatform for AndroidPlatform {
    fn usage_access_mode(&self) -> Result<AccessMode, PlatformError> {
        self.with_env(|env, context| {
            let sdk = call(env, "Build.VERSION.SDK_INT", |env| {
                env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?.i()
            })?;
            if sdk < MIN_SDK_USAGE_STATS {
                return Err(PlatformError::Unsupported("Usage access before Android 5.0"));
            }

            let app_ops = system_service(env, context, APP_OPS_SERVICE)?
                .ok_or(PlatformError::ServiceUnavailable("AppOpsManager"))?;
            let uid = call(env, "Process.myUid", |env| {
                env.call_static_method("android/os/Process", "myUid", "()I", &[])?.i()
            })?;

            let mode = call(env, "AppOpsManager.checkOpNoThrow", |env| {
                let op = env.new_string(OPSTR_GET_USAGE_STATS)?;
                let package = env
                    .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])?
                    .l()?;
                env.call_method(
                    &app_ops,
                    "checkOpNoThrow",
                    "(Ljava/lang/String;ILjava/lang/String;)I",
                    &[JValue::Object(&op), JValue::Int(uid), JValue::Object(&package)],
                )?
                .i()
            })?;

            Ok(AccessMode::from_raw(mode))
        })
    }

    fn open_usage_access_settings(&self) -> Result<(), PlatformError> {
        self.with_env(|env, context| {
            call(env, "startActivity(USAGE_ACCESS_SETTINGS)", |env| {
                let action = env.new_string(ACTION_USAGE_ACCESS_SETTINGS)?;
                let intent = env.new_object(
                    "android/content/Intent",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&action)],
                )?;
                env.call_method(
                    &intent,
                    "addFlags",
                    "(I)Landroid/content/Intent;",
                    &[JValue::Int(FLAG_ACTIVITY_NEW_TASK)],
                )?;
                env.call_method(
                    context,
                    "startActivity",
                    "(Landroid/content/Intent;)V",
                    &[JValue::Object(&intent)],
                )?;
                Ok(())
            })
        })
    }

    fn installed_packages(&self) -> Result<Vec<PackageEntry>, PlatformError> {
        self.with_env(|env, context| {
            let pm = package_manager(env, context)?;
            let list = call(env, "getInstalledApplications", |env| {
                env.call_method(
                    &pm,
                    "getInstalledApplications",
                    "(I)Ljava/util/List;",
                    &[JValue::Int(GET_META_DATA)],
                )?
                .l()
            })?;
            let size = call(env, "List.size", |env| env.call_method(&list, "size", "()I", &[])?.i())?;

            let mut entries = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
            for index in 0..size {
                let entry = env.with_local_frame(
                    ITEM_FRAME_CAPACITY,
                    |env| -> Result<PackageEntry, PlatformError> {
                        let info = call(env, "List.get", |env| {
                            env.call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
                                .l()
                        })?;
                        read_application_info(env, &pm, &info)
                    },
                )?;
                entries.push(entry);
            }
            Ok(entries)
        })
    }

    fn application_label(&self, package_name: &str) -> Result<String, PlatformError> {
        self.with_env(|env, context| {
            let pm = package_manager(env, context)?;
            // getApplicationInfo throws NameNotFoundException for uninstalled packages
            let info = call(env, "getApplicationInfo", |env| {
                let name = env.new_string(package_name)?;
                env.call_method(
                    &pm,
                    "getApplicationInfo",
                    "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
                    &[JValue::Object(&name), JValue::Int(0)],
                )?
                .l()
            })
            .map_err(|_| PlatformError::PackageNotFound(package_name.to_string()))?;
            application_label_of(env, &pm, &info)
        })
    }

    fn usage_stats_service(&self) -> Result<Box<dyn UsageStatsService + '_>, PlatformError> {
        let manager = self.with_env(|env, context| {
            let service = system_service(env, context, USAGE_STATS_SERVICE)?
                .ok_or(PlatformError::ServiceUnavailable("UsageStatsManager"))?;
            Ok(env.new_global_ref(service)?)
        })?;
        Ok(Box::new(AndroidUsageStats {
            vm: &self.vm,
            manager,
        }))
    }
}

impl IconSource for AndroidPlatform {
    fn application_icon(&self, package_name: &str, size_px: u32) -> Result<RgbaIcon, PlatformError> {
        let side = i32::try_from(size_px)
            .map_err(|_| PlatformError::Call(format!("Icon size {size_px} out of range")))?;

        self.with_env(|env, context| {
            // One frame per icon: the drawable, bitmap and pixel array are
            // released before the next icon is drawn.
            env.with_local_frame(ITEM_FRAME_CAPACITY, |env| -> Result<RgbaIcon, PlatformError> {
                let pm = package_manager(env, context)?;
                let drawable = call(env, "getApplicationIcon", |env| {
                    let name = env.new_string(package_name)?;
                    env.call_method(
                        &pm,
                        "getApplicationIcon",
                        "(Ljava/lang/String;)Landroid/graphics/drawable/Drawable;",
                        &[JValue::Object(&name)],
                    )?
                    .l()
                })?;
                let bitmap = call(env, "Bitmap.createBitmap", |env| {
                    let config = env
                        .get_static_field(
                            "android/graphics/Bitmap$Config",
                            "ARGB_8888",
                            "Landroid/graphics/Bitmap$Config;",
                        )?
                        .l()?;
                    env.call_static_method(
                        "android/graphics/Bitmap",
                        "createBitmap",
                        "(IILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
                        &[JValue::Int(side), JValue::Int(side), JValue::Object(&config)],
                    )?
                    .l()
                })?;

                let pixels = draw_and_read_pixels(env, &drawable, &bitmap, side);
                if let Err(e) = call(env, "Bitmap.recycle", |env| {
                    env.call_method(&bitmap, "recycle", "()V", &[]).map(|_| ())
                }) {
                    log::warn!("Failed to recycle icon bitmap for {package_name}: {e}");
                }

                Ok(RgbaIcon {
                    width: size_px,
                    height: size_px,
                    pixels: argb_to_rgba(&pixels?),
                })
            })
        })
    }
}

struct AndroidUsageStats<'a> {
    vm: &'a JavaVM,
    manager: GlobalRef,
}

impl UsageStatsService for AndroidUsageStats<'_> {
    fn query_and_aggregate(&self, range: TimeRange) -> Result<Vec<RawUsageStats>, PlatformError> {
        let mut guard = self.vm.attach_current_thread()?;
        let env: &mut JNIEnv<'_> = &mut guard;

        let map = call(env, "queryAndAggregateUsageStats", |env| {
            env.call_method(
                &self.manager,
                "queryAndAggregateUsageStats",
                "(JJ)Ljava/util/Map;",
                &[JValue::Long(range.start_ms), JValue::Long(range.end_ms)],
            )?
            .l()
        })?;
        if map.is_null() {
            return Ok(Vec::new());
        }

        let iterator = call(env, "Map.values().iterator()", |env| {
            let values = env.call_method(&map, "values", "()Ljava/util/Collection;", &[])?.l()?;
            env.call_method(&values, "iterator", "()Ljava/util/Iterator;", &[])?.l()
        })?;

        let mut stats = Vec::new();
        while call(env, "Iterator.hasNext", |env| {
            env.call_method(&iterator, "hasNext", "()Z", &[])?.z()
        })? {
            let entry = env.with_local_frame(
                ITEM_FRAME_CAPACITY,
                |env| -> Result<RawUsageStats, PlatformError> {
                    let item = call(env, "Iterator.next", |env| {
                        env.call_method(&iterator, "next", "()Ljava/lang/Object;", &[])?.l()
                    })?;
                    read_usage_stats(env, &item)
                },
            )?;
            stats.push(entry);
        }
        Ok(stats)
    }
}

impl From<jni::errors::Error> for PlatformError {
    fn from(e: jni::errors::Error) -> Self {
        PlatformError::Call(format!("JNI call failed: {e}"))
    }
}

/// Run a JNI sequence, clearing any Java exception it leaves behind.
fn call<'local, T>(
    env: &mut JNIEnv<'local>,
    what: &str,
    f: impl FnOnce(&mut JNIEnv<'local>) -> jni::errors::Result<T>,
) -> Result<T, PlatformError> {
    match f(env) {
        Ok(value) => Ok(value),
        Err(e) => {
            clear_pending_exception(env);
            Err(PlatformError::Call(format!("{what} failed: {e}")))
        }
    }
}

fn clear_pending_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        if let Err(e) = env.exception_clear() {
            log::warn!("Failed to clear pending Java exception: {e}");
        }
    }
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> jni::errors::Result<String> {
    let s = JString::from(obj);
    let value: String = env.get_string(&s)?.into();
    Ok(value)
}

fn system_service<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
    name: &str,
) -> Result<Option<JObject<'local>>, PlatformError> {
    let service = call(env, "getSystemService", |env| {
        let name = env.new_string(name)?;
        env.call_method(
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&name)],
        )?
        .l()
    })?;
    Ok((!service.is_null()).then_some(service))
}

fn package_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>, PlatformError> {
    call(env, "getPackageManager", |env| {
        env.call_method(context, "getPackageManager", "()Landroid/content/pm/PackageManager;", &[])?
            .l()
    })
}

fn read_application_info(
    env: &mut JNIEnv<'_>,
    pm: &JObject<'_>,
    info: &JObject<'_>,
) -> Result<PackageEntry, PlatformError> {
    let package_name = call(env, "ApplicationInfo.packageName", |env| {
        let name = env.get_field(info, "packageName", "Ljava/lang/String;")?.l()?;
        java_string(env, name)
    })?;
    let flags = call(env, "ApplicationInfo.flags", |env| env.get_field(info, "flags", "I")?.i())?;
    let label = application_label_of(env, pm, info)?;

    Ok(PackageEntry {
        package_name,
        label,
        is_system: flags & FLAG_SYSTEM != 0,
    })
}

fn application_label_of(
    env: &mut JNIEnv<'_>,
    pm: &JObject<'_>,
    info: &JObject<'_>,
) -> Result<String, PlatformError> {
    call(env, "getApplicationLabel", |env| {
        let label = env
            .call_method(
                pm,
                "getApplicationLabel",
                "(Landroid/content/pm/ApplicationInfo;)Ljava/lang/CharSequence;",
                &[JValue::Object(info)],
            )?
            .l()?;
        let text = env.call_method(&label, "toString", "()Ljava/lang/String;", &[])?.l()?;
        java_string(env, text)
    })
}

fn read_usage_stats(env: &mut JNIEnv<'_>, stats: &JObject<'_>) -> Result<RawUsageStats, PlatformError> {
    let package_name = call(env, "UsageStats.getPackageName", |env| {
        let name = env.call_method(stats, "getPackageName", "()Ljava/lang/String;", &[])?.l()?;
        java_string(env, name)
    })?;
    let mut long_getter = |method: &'static str| {
        call(env, method, |env| env.call_method(stats, method, "()J", &[])?.j())
    };

    Ok(RawUsageStats {
        total_time_in_foreground: long_getter("getTotalTimeInForeground")?,
        last_time_used: long_getter("getLastTimeUsed")?,
        first_time_stamp: long_getter("getFirstTimeStamp")?,
        last_time_stamp: long_getter("getLastTimeStamp")?,
        package_name,
    })
}

fn draw_and_read_pixels(
    env: &mut JNIEnv<'_>,
    drawable: &JObject<'_>,
    bitmap: &JObject<'_>,
    side: i32,
) -> Result<Vec<i32>, PlatformError> {
    call(env, "Drawable.draw", |env| {
        let canvas = env.new_object(
            "android/graphics/Canvas",
            "(Landroid/graphics/Bitmap;)V",
            &[JValue::Object(bitmap)],
        )?;
        env.call_method(
            drawable,
            "setBounds",
            "(IIII)V",
            &[JValue::Int(0), JValue::Int(0), JValue::Int(side), JValue::Int(side)],
        )?;
        env.call_method(
            drawable,
            "draw",
            "(Landroid/graphics/Canvas;)V",
            &[JValue::Object(&canvas)],
        )?;
        Ok(())
    })?;

    let len = side
        .checked_mul(side)
        .ok_or_else(|| PlatformError::Call(format!("Icon size {side} out of range")))?;
    let mut pixels = vec![0_i32; usize::try_from(len).unwrap_or_default()];

    call(env, "Bitmap.getPixels", |env| {
        let array = env.new_int_array(len)?;
        env.call_method(
            bitmap,
            "getPixels",
            "([IIIIIII)V",
            &[
                JValue::Object(&array),
                JValue::Int(0),
                JValue::Int(side),
                JValue::Int(0),
                JValue::Int(0),
                JValue::Int(side),
                JValue::Int(side),
            ],
        )?;
        env.get_int_array_region(&array, 0, &mut pixels)
    })?;
    Ok(pixels)
}
