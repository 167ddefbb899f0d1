//! 班级时段解析
//!
//! 根据门店当地时间、星期设置、节假日以及当天手动关闭的班级，
//! 计算新登记应进入的班级。纯读取，不修改任何状态。
//!
//! 星期统一使用 `chrono::Weekday`，展示过滤与时段解析共用
//! [`StoreSettings::classes_on`]，不存在数字星期索引。

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use shared::models::{ClassSession, SlotInfo, SlotUnavailable, StoreSettings};

/// 单个班级的实时占用快照
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassLoad {
    /// waiting + called 条目数
    pub occupancy: u32,
}

/// 时段解析输入
pub struct SlotQuery<'a> {
    pub settings: &'a StoreSettings,
    /// 当前营业日的日期，`None` 表示未开启
    ///
    /// 跨过午夜的营业日仍按开启当天的班级解析，与看板一致。
    pub business_date: Option<NaiveDate>,
    pub closed: &'a HashSet<i64>,
    pub loads: &'a HashMap<i64, ClassLoad>,
}

/// 解析下一个可登记的班级
///
/// 规则：
/// 1. 营业日未开启 → `BusinessNotOpen`
/// 2. 当天 (节假日 > 周末 > 工作日) 没有适用班级 → `NoClassScheduled`
/// 3. 适用班级全部手动关闭 → `AllClassesClosed`
/// 4. 按 `class_number` 取第一个未满的班级，否则 `AllClassesFull`
pub fn resolve_next_slot(query: &SlotQuery<'_>) -> Result<SlotInfo, SlotUnavailable> {
    let Some(date) = query.business_date else {
        return Err(SlotUnavailable::BusinessNotOpen);
    };

    let scheduled = query.settings.classes_on(date);
    if scheduled.is_empty() {
        return Err(SlotUnavailable::NoClassScheduled);
    }

    let open: Vec<&ClassSession> = scheduled
        .into_iter()
        .filter(|c| !query.closed.contains(&c.id))
        .collect();
    if open.is_empty() {
        return Err(SlotUnavailable::AllClassesClosed);
    }

    open.into_iter()
        .find_map(|class| {
            let occupancy = query.loads.get(&class.id).copied().unwrap_or_default().occupancy;
            (occupancy < class.max_capacity).then(|| SlotInfo {
                class_id: class.id,
                class_name: class.name.clone(),
                class_order: occupancy + 1,
                max_capacity: class.max_capacity,
            })
        })
        .ok_or(SlotUnavailable::AllClassesFull)
}

/// 顺序关闭检查：同一天中排在 `class_id` 之前且仍未关闭的班级
///
/// `class_id` 当天不适用时返回空列表。
pub fn open_earlier_classes(
    settings: &StoreSettings,
    date: NaiveDate,
    class_id: i64,
    closed: &HashSet<i64>,
) -> Vec<i64> {
    let today = settings.classes_on(date);
    let Some(target) = today.iter().find(|c| c.id == class_id) else {
        return Vec::new();
    };
    today
        .iter()
        .filter(|c| c.class_number < target.class_number && !closed.contains(&c.id))
        .map(|c| c.id)
        .collect()
}
