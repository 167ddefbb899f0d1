//! 单个班级的有序队列
//!
//! `live` 中的条目始终满足 `class_order == index + 1`，每次变更后
//! 调用 [`ClassQueue::compact`] 重新编号。离开队列的条目 (attended /
//! cancelled) 移到 `settled`，用于查询和营业日统计。

use shared::models::{WaitingEntry, WaitingStatus};

#[derive(Debug)]
pub struct ClassQueue {
    class_id: i64,
    live: Vec<WaitingEntry>,
    settled: Vec<WaitingEntry>,
}

impl ClassQueue {
    pub fn new(class_id: i64) -> Self {
        Self {
            class_id,
            live: Vec::new(),
            settled: Vec::new(),
        }
    }

    pub fn class_id(&self) -> i64 {
        self.class_id
    }

    /// waiting + called 条目数
    pub fn occupancy(&self) -> u32 {
        self.live.len() as u32
    }

    pub fn live(&self) -> &[WaitingEntry] {
        &self.live
    }

    pub fn settled(&self) -> &[WaitingEntry] {
        &self.settled
    }

    pub fn contains(&self, entry_id: i64) -> bool {
        self.get(entry_id).is_some()
    }

    pub fn get(&self, entry_id: i64) -> Option<&WaitingEntry> {
        self.live
            .iter()
            .chain(self.settled.iter())
            .find(|e| e.id == entry_id)
    }

    fn live_index(&self, entry_id: i64) -> Option<usize> {
        self.live.iter().position(|e| e.id == entry_id)
    }

    pub fn get_live_mut(&mut self, entry_id: i64) -> Option<&mut WaitingEntry> {
        self.live.iter_mut().find(|e| e.id == entry_id)
    }

    /// 追加到队尾，返回分配后的条目
    pub fn push_back(&mut self, mut entry: WaitingEntry) -> WaitingEntry {
        entry.class_id = self.class_id;
        entry.class_order = self.occupancy() + 1;
        self.live.push(entry.clone());
        entry
    }

    /// 插入到指定位置 (1-based)，超出队尾时放在队尾
    pub fn insert_at(&mut self, position: u32, mut entry: WaitingEntry) -> WaitingEntry {
        let index = (position.max(1) as usize - 1).min(self.live.len());
        entry.class_id = self.class_id;
        self.live.insert(index, entry);
        self.compact();
        self.live[index].clone()
    }

    /// 从 live 中取出条目并压缩 (用于跨班级移动)
    pub fn take_live(&mut self, entry_id: i64) -> Option<WaitingEntry> {
        let index = self.live_index(entry_id)?;
        let entry = self.live.remove(index);
        self.compact();
        Some(entry)
    }

    /// 将 live 条目结算为终态并压缩
    pub fn settle(
        &mut self,
        entry_id: i64,
        status: WaitingStatus,
        now: i64,
    ) -> Option<WaitingEntry> {
        let index = self.live_index(entry_id)?;
        let mut entry = self.live.remove(index);
        entry.status = status;
        entry.settled_at = Some(now);
        self.settled.push(entry.clone());
        self.compact();
        Some(entry)
    }

    /// 批量结算，只压缩一次。任何 ID 不在 live 中时不做修改并返回 `Err(id)`。
    pub fn settle_many(
        &mut self,
        entry_ids: &[i64],
        status: WaitingStatus,
        now: i64,
    ) -> Result<Vec<WaitingEntry>, i64> {
        if let Some(missing) = entry_ids.iter().find(|id| self.live_index(**id).is_none()) {
            return Err(*missing);
        }
        let (settled, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|e| entry_ids.contains(&e.id));
        self.live = kept;
        let settled: Vec<WaitingEntry> = settled
            .into_iter()
            .map(|mut e| {
                e.status = status;
                e.settled_at = Some(now);
                e
            })
            .collect();
        self.settled.extend(settled.iter().cloned());
        self.compact();
        Ok(settled)
    }

    /// 结算全部 live 条目，返回结算数量
    pub fn settle_all(&mut self, status: WaitingStatus, now: i64) -> u32 {
        let count = self.occupancy();
        for mut entry in self.live.drain(..) {
            entry.status = status;
            entry.settled_at = Some(now);
            self.settled.push(entry);
        }
        count
    }

    /// 交换两个 live 条目的位置，任一不在 live 中返回 false
    pub fn swap(&mut self, entry_a: i64, entry_b: i64) -> bool {
        match (self.live_index(entry_a), self.live_index(entry_b)) {
            (Some(a), Some(b)) => {
                self.live.swap(a, b);
                self.compact();
                true
            }
            _ => false,
        }
    }

    /// 重新编号，保持相对顺序
    pub fn compact(&mut self) {
        for (index, entry) in self.live.iter_mut().enumerate() {
            entry.class_order = index as u32 + 1;
        }
    }

    /// 所有条目 (live 在前，按 class_order)
    pub fn all_entries(&self) -> impl Iterator<Item = &WaitingEntry> {
        self.live.iter().chain(self.settled.iter())
    }
}
