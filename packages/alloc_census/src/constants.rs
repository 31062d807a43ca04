pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - continued execution is not safe";

pub(crate) const ERR_INTEREST_UNDERFLOW: &str =
    "allocation event interest released more times than acquired - session bookkeeping is broken";

pub(crate) const ERR_COUNTER_MISSING: &str =
    "allocation counter vanished while its session was live - session bookkeeping is broken";
